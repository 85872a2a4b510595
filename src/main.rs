//! # blockprint CLI
//!
//! Command-line interface for the blockprint hashing engine.
//!
//! ## Usage
//! ```bash
//! blockprint hash ~/Pictures --algorithm blockhash
//! blockprint compare left.jpg right.jpg
//! blockprint distance deadbeef beefca47
//! ```

mod cli;

use blockprint::Result;

fn main() -> Result<()> {
    cli::run()
}
