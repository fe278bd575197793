/// Numeric helpers.
///
/// Conversions between arbitrary-precision integers and `f64` for mixed
/// arithmetic, plus the literal readers and the canonical decimal
/// formatter shared by the parser and the value model.
pub mod num;
