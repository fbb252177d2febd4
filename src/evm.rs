/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! EVM versions accepted by the `--evm-version` flag of the Solidity compiler.

use std::{fmt, str::FromStr};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvmVersion {
    Frontier,
    Homestead,
    Byzantium,
    Constantinople,
    Istanbul,
    Berlin,
    London,
    Shanghai,
    Cancun,
    Paris,
}

impl EvmVersion {
    pub const ALL: [EvmVersion; 10] = [
        EvmVersion::Frontier,
        EvmVersion::Homestead,
        EvmVersion::Byzantium,
        EvmVersion::Constantinople,
        EvmVersion::Istanbul,
        EvmVersion::Berlin,
        EvmVersion::London,
        EvmVersion::Shanghai,
        EvmVersion::Cancun,
        EvmVersion::Paris,
    ];

    /// Value passed to `--evm-version`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvmVersion::Frontier => "frontier",
            EvmVersion::Homestead => "homestead",
            EvmVersion::Byzantium => "byzantium",
            EvmVersion::Constantinople => "constantinople",
            EvmVersion::Istanbul => "istanbul",
            EvmVersion::Berlin => "berlin",
            EvmVersion::London => "london",
            EvmVersion::Shanghai => "shanghai",
            EvmVersion::Cancun => "cancun",
            EvmVersion::Paris => "paris",
        }
    }
}

impl fmt::Display for EvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvmVersion {
    type Err = Error;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EvmVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::InvalidEvmVersion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_known_version() {
        for name in [
            "frontier",
            "homestead",
            "byzantium",
            "constantinople",
            "istanbul",
            "berlin",
            "london",
            "shanghai",
            "cancun",
            "paris",
        ] {
            let version: EvmVersion = name.parse().unwrap();
            assert_eq!(version.as_str(), name);
        }
    }

    #[test]
    fn rejects_unknown_and_miscased_versions() {
        for name in ["Cancun", "hello", "", "paris ", "PARIS"] {
            match name.parse::<EvmVersion>() {
                Err(Error::InvalidEvmVersion(v)) => assert_eq!(v, name),
                other => panic!("expected InvalidEvmVersion for {name:?}, got {other:?}"),
            }
        }
    }
}
