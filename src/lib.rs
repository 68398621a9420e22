// src/lib.rs

// 1. Data Structures (The "Nouns")
// explicit 'pub' makes them available to main.rs
pub mod models;

// 2. Interfaces (The "Contract")
pub mod traits;

// 3. Key Material and Wire Encoding (The "Envelope")
pub mod keys;
pub mod tx;
pub mod xdr;

// 4. Network Adapter (The "Plumbing")
pub mod aurora;

// 5. The Scripted Sequence (The "Orchestrator")
pub mod flow;

// 6. Runner Configuration
pub mod config;
