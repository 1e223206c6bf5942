// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing keyphrase data.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, constants and traits
//
// Everything that later becomes a tensor starts life here as
// a Vec<usize>.

// Reserved vocabulary words and their fixed ids
pub mod specials;

// Raw / tokenised pairs and the id-level example records
pub mod example;

// PairSource and Tokenize abstractions
pub mod traits;
