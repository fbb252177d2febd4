/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Target platforms used to select an image variant. The table of supported pairs follows the
//! compatible platforms accepted by the Docker CLI.

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Operating system part of a [Platform].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    DragonFly,
    FreeBsd,
    Linux,
    NetBsd,
    OpenBsd,
    Plan9,
    Solaris,
    Windows,
}

impl Os {
    pub const ALL: [Os; 9] = [
        Os::Darwin,
        Os::DragonFly,
        Os::FreeBsd,
        Os::Linux,
        Os::NetBsd,
        Os::OpenBsd,
        Os::Plan9,
        Os::Solaris,
        Os::Windows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::DragonFly => "dragonfly",
            Os::FreeBsd => "freebsd",
            Os::Linux => "linux",
            Os::NetBsd => "netbsd",
            Os::OpenBsd => "openbsd",
            Os::Plan9 => "plan9",
            Os::Solaris => "solaris",
            Os::Windows => "windows",
        }
    }
}

/// CPU architecture part of a [Platform].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    I386,
    Arm,
    Arm64,
    Amd64,
    Ppc64le,
    Mips64,
    Mips64le,
    S390x,
}

impl Arch {
    pub const ALL: [Arch; 8] = [
        Arch::I386,
        Arch::Arm,
        Arch::Arm64,
        Arch::Amd64,
        Arch::Ppc64le,
        Arch::Mips64,
        Arch::Mips64le,
        Arch::S390x,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::I386 => "386",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Amd64 => "amd64",
            Arch::Ppc64le => "ppc64le",
            Arch::Mips64 => "mips64",
            Arch::Mips64le => "mips64le",
            Arch::S390x => "s390x",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SUPPORTED: [(Os, Arch); 27] = [
    (Os::Darwin, Arch::I386),
    (Os::Darwin, Arch::Amd64),
    (Os::Darwin, Arch::Arm),
    (Os::Darwin, Arch::Arm64),
    (Os::DragonFly, Arch::Amd64),
    (Os::FreeBsd, Arch::I386),
    (Os::FreeBsd, Arch::Amd64),
    (Os::FreeBsd, Arch::Arm),
    (Os::Linux, Arch::I386),
    (Os::Linux, Arch::Amd64),
    (Os::Linux, Arch::Arm),
    (Os::Linux, Arch::Arm64),
    (Os::Linux, Arch::Ppc64le),
    (Os::Linux, Arch::Mips64),
    (Os::Linux, Arch::Mips64le),
    (Os::Linux, Arch::S390x),
    (Os::NetBsd, Arch::I386),
    (Os::NetBsd, Arch::Amd64),
    (Os::NetBsd, Arch::Arm),
    (Os::OpenBsd, Arch::I386),
    (Os::OpenBsd, Arch::Amd64),
    (Os::OpenBsd, Arch::Arm),
    (Os::Plan9, Arch::I386),
    (Os::Plan9, Arch::Amd64),
    (Os::Solaris, Arch::Amd64),
    (Os::Windows, Arch::I386),
    (Os::Windows, Arch::Amd64),
];

/// An (operating system, architecture) pair recognised by the container runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    /// Returns None if the pair is not in the runtime's table of compatible platforms.
    pub fn new(os: Os, arch: Arch) -> Option<Self> {
        SUPPORTED
            .contains(&(os, arch))
            .then_some(Platform { os, arch })
    }

    /// Platform used by every tool unless configured otherwise.
    pub const fn linux_amd64() -> Self {
        Platform {
            os: Os::Linux,
            arch: Arch::Amd64,
        }
    }

    pub fn supported() -> impl Iterator<Item = Platform> {
        SUPPORTED.iter().map(|&(os, arch)| Platform { os, arch })
    }

    pub fn os(&self) -> Os {
        self.os
    }

    pub fn architecture(&self) -> Arch {
        self.arch
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::linux_amd64()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || Error::UnsupportedPlatform(s.to_string());
        let (os, arch) = s.split_once('/').ok_or_else(unsupported)?;
        let os = Os::ALL
            .into_iter()
            .find(|o| o.as_str() == os)
            .ok_or_else(unsupported)?;
        let arch = Arch::ALL
            .into_iter()
            .find(|a| a.as_str() == arch)
            .ok_or_else(unsupported)?;
        Platform::new(os, arch).ok_or_else(unsupported)
    }
}
