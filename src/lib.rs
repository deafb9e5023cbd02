pub mod eval;
pub mod image;
pub mod lex;
pub mod ops;
pub mod render;
pub mod rle;

pub use eval::{Calculator, Session, evaluate};
pub use image::Image;
pub use lex::Lexer;
pub use rle::{CompressedImage, Run, compress, decompress};
