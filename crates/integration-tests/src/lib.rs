//! HTTP-level tests for the whole stack live under `tests/`.
