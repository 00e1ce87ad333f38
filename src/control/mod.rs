pub mod envelope_scan;
pub mod environment;
pub mod fadec;
pub mod guidance;
pub mod propulsion;
pub mod synthetic_engine;
