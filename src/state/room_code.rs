//! Room code allocation.
//!
//! Codes use Crockford's Base32 alphabet (no I, L, O, U) so they survive
//! being read aloud across a lawn. Lookups are case-insensitive.

use std::collections::HashMap;

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// The allocator ran out of attempts without finding a free code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodesExhausted {
    pub attempts: u32,
}

/// Hands out join codes that are unique among live matches.
#[derive(Debug)]
pub struct RoomCodeAllocator {
    length: usize,
    max_attempts: u32,
    /// Code to match ID
    issued: HashMap<String, String>,
}

impl RoomCodeAllocator {
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length,
            max_attempts,
            issued: HashMap::new(),
        }
    }

    /// Allocate a code for a match using the thread RNG.
    pub fn allocate(&mut self, match_id: &str) -> Result<String, CodesExhausted> {
        self.allocate_with(match_id, &mut rand::thread_rng())
    }

    /// Allocate a code drawing from the given RNG.
    pub fn allocate_with<R: Rng>(
        &mut self,
        match_id: &str,
        rng: &mut R,
    ) -> Result<String, CodesExhausted> {
        for _ in 0..self.max_attempts {
            let code = self.draw(rng);
            if !self.issued.contains_key(&code) {
                self.issued.insert(code.clone(), match_id.to_string());
                return Ok(code);
            }
        }
        Err(CodesExhausted {
            attempts: self.max_attempts,
        })
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| CROCKFORD[rng.gen_range(0..CROCKFORD.len())] as char)
            .collect()
    }

    /// Match ID a code was issued to.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.issued
            .get(&code.trim().to_uppercase())
            .map(String::as_str)
    }

    /// Free a code so it can be issued again.
    pub fn release(&mut self, code: &str) -> Option<String> {
        self.issued.remove(&code.trim().to_uppercase())
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}
