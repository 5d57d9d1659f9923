//! Badge styling.
//!
//! A badge combines a visual variant with a lobby status. The class resolver
//! produces the utility-class string used by web front-ends sharing the same
//! snapshot format; [`Badge`] renders the same pairing in the terminal.

use std::fmt;
use std::str::FromStr;

use ratatui::prelude::*;
use serde::{Deserialize, Serialize};

const BASE_CLASS: &str = "inline-flex items-center rounded-full border px-2.5 py-0.5 text-xs font-semibold transition-colors focus:outline-none focus:ring-2 focus:ring-ring focus:ring-offset-2";

/// Visual variant of a badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    #[default]
    Default,
    Secondary,
    Destructive,
    Outline,
}

impl BadgeVariant {
    pub fn class(self) -> &'static str {
        match self {
            Self::Default => {
                "border-transparent bg-primary text-primary-foreground hover:bg-primary/80"
            }
            Self::Secondary => {
                "border-transparent bg-secondary text-secondary-foreground hover:bg-secondary/80"
            }
            Self::Destructive => {
                "border-transparent bg-destructive text-destructive-foreground hover:bg-destructive/80"
            }
            Self::Outline => "text-foreground",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Default => Style::default().fg(Color::Black).bg(Color::White),
            Self::Secondary => Style::default().fg(Color::White).bg(Color::DarkGray),
            Self::Destructive => Style::default().fg(Color::White).bg(Color::Red),
            Self::Outline => Style::default().fg(Color::White),
        }
    }
}

/// Lobby status a badge can reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStatus {
    Waiting,
    Ongoing,
    Completed,
    Neutral,
}

impl BadgeStatus {
    pub const ALL: [BadgeStatus; 4] = [Self::Waiting, Self::Ongoing, Self::Completed, Self::Neutral];

    /// Key used on the wire and in `badge_class`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Neutral => "neutral",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Waiting => {
                "bg-orange-100 text-orange-600 dark:bg-orange-900 dark:text-orange-300"
            }
            Self::Ongoing => "bg-blue-100 text-blue-600 dark:bg-blue-900 dark:text-blue-300",
            Self::Completed => {
                "bg-green-100 text-green-600 dark:bg-green-900 dark:text-green-300"
            }
            Self::Neutral => "",
        }
    }

    fn color(self) -> Option<Color> {
        match self {
            Self::Waiting => Some(Color::LightRed),
            Self::Ongoing => Some(Color::LightBlue),
            Self::Completed => Some(Color::Green),
            Self::Neutral => None,
        }
    }
}

/// Error returned when a variant or status key is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown badge key: {}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for BadgeVariant {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "secondary" => Ok(Self::Secondary),
            "destructive" => Ok(Self::Destructive),
            "outline" => Ok(Self::Outline),
            _ => Err(UnknownKey(s.to_string())),
        }
    }
}

impl FromStr for BadgeStatus {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// Resolve the class string for a badge.
///
/// Parts are emitted in order: base, variant, `class_name`, status. An
/// unrecognised `status` contributes nothing rather than failing.
pub fn badge_class(variant: BadgeVariant, class_name: Option<&str>, status: &str) -> String {
    let status_class = status.parse::<BadgeStatus>().map_or("", BadgeStatus::class);

    [BASE_CLASS, variant.class(), class_name.unwrap_or(""), status_class]
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A badge rendered inline in the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub variant: BadgeVariant,
    pub status: Option<BadgeStatus>,
    pub label: String,
}

impl Badge {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            variant: BadgeVariant::default(),
            status: None,
            label: label.into(),
        }
    }

    pub fn variant(mut self, variant: BadgeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the status from a raw key; unknown keys leave the badge unstyled.
    pub fn status(mut self, status: &str) -> Self {
        self.status = status.parse().ok();
        self
    }

    /// Variant style with the status colour layered on top.
    pub fn style(&self) -> Style {
        let style = self.variant.style().bold();
        match self.status.and_then(BadgeStatus::color) {
            Some(color) => style.fg(color).bg(Color::Reset),
            None => style,
        }
    }

    pub fn class(&self) -> String {
        badge_class(self.variant, None, self.status.map_or("", BadgeStatus::as_str))
    }

    pub fn to_span(&self) -> Span<'static> {
        Span::styled(format!(" {} ", self.label), self.style())
    }
}
