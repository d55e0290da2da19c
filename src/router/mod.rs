//! Static destination table and the access rule attached to each entry.
//!
//! SYSTEM CONTEXT
//! ==============
//! `app` mounts one route per [`Destination`]; `guard` consults
//! [`Destination::access`] before each navigation.


pub mod guard;

/// Whether a destination requires a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Every named in-app destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Home,
    Login,
    Register,
    First,
    Second,
    Profile,
}

impl Destination {
    pub const ALL: [Self; 6] = [Self::Home, Self::Login, Self::Register, Self::First, Self::Second, Self::Profile];

    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
            Self::First => "first",
            Self::Second => "second",
            Self::Profile => "profile",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::First => "/first",
            Self::Second => "/second",
            Self::Profile => "/profile",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Self::First | Self::Second | Self::Profile => Access::Protected,
            Self::Home | Self::Login | Self::Register => Access::Public,
        }
    }
}
