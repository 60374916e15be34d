pub mod completion;
pub mod index;
pub mod language;
pub mod lsp;
pub mod markup;
pub mod workspace;
