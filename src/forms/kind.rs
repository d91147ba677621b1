//! Form variants and the closed set of job positions

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The two public forms served by the intake endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Contact,
    Application,
}

impl FormKind {
    /// Route that accepts submissions for this form
    pub const fn path(self) -> &'static str {
        match self {
            Self::Contact => "/contact/send",
            Self::Application => "/careers/apply",
        }
    }

    /// Storage partition shared by every record of this form
    pub const fn partition_key(self) -> &'static str {
        match self {
            Self::Contact => "website#contact",
            Self::Application => "website#careers#application",
        }
    }

    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Contact => "Contact form submitted successfully",
            Self::Application => "Application submitted successfully",
        }
    }

    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Contact => "Failed to process contact form",
            Self::Application => "Failed to process application",
        }
    }

    /// Name used in log lines
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "contact form",
            Self::Application => "job application",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        [Self::Contact, Self::Application]
            .into_iter()
            .find(|kind| kind.path() == path)
    }
}

/// Open positions accepted by the careers form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum JobId {
    ManufacturingOperator,
    CustomerSuccess,
    BrandManager,
    SalesLeader,
}

impl JobId {
    /// Human-readable position title used in notification emails
    pub const fn title(self) -> &'static str {
        match self {
            Self::ManufacturingOperator => "Front Line Manufacturing Operator",
            Self::CustomerSuccess => "Customer Success Manager",
            Self::BrandManager => "Brand Manager",
            Self::SalesLeader => "Sales Team Leader",
        }
    }
}

/// Stored as the kebab-case identifier the form posts
impl Serialize for JobId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}
