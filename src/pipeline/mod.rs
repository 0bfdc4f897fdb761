pub mod aggregate;
pub mod attributes;
pub mod builder;
pub mod error;
pub mod extractor;
pub mod merge;
pub mod reshape;
pub mod source_reader;

#[cfg(test)]
pub(crate) mod test_support;
