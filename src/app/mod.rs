// Application layer: pipelines wiring sources, normalizer and storage together.

pub mod pipelines;
