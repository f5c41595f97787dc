pub mod line_signature;
