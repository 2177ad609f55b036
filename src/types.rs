use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// State of a topic as computed by SHOUT! after applying an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TopicState {
    /// The topic has been OK for multiple updates
    #[default]
    Working,
    /// The topic went from not OK to OK on the most recent update
    Fixed,
    /// The topic is not OK
    Broken,
}

impl TopicState {
    /// Strict parse of a wire string, `None` if it is not a known state
    pub fn from_wire(state: &str) -> Option<Self> {
        match state {
            "working" => Some(TopicState::Working),
            "fixed" => Some(TopicState::Fixed),
            "broken" => Some(TopicState::Broken),
            _ => None,
        }
    }

    /// The string SHOUT! uses for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicState::Working => "working",
            TopicState::Fixed => "fixed",
            TopicState::Broken => "broken",
        }
    }

    /// Whether the topic is currently healthy
    pub fn is_ok(&self) -> bool {
        !matches!(self, TopicState::Broken)
    }
}

impl Display for TopicState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a wire state string to a [`TopicState`]
///
/// Anything that is not `"working"`, `"fixed"` or `"broken"` (including the
/// empty string) maps to [`TopicState::Working`]. Use
/// [`TopicState::from_wire`] to tell unknown strings apart.
pub fn parse_state(state: &str) -> TopicState {
    TopicState::from_wire(state).unwrap_or_default()
}

/// An event to post to SHOUT!
///
/// # Example
///
/// ```rust
/// use shout_client::EventIn;
///
/// let event = EventIn::broken("nightly-backup")
///     .with_message("backup job exited with status 1")
///     .with_link("https://ci.example.com/jobs/42");
/// assert!(!event.ok);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EventIn {
    /// The topic name
    pub topic: String,

    /// A message about the event
    pub message: String,

    /// A URL relevant to the event, may be empty
    pub link: String,

    /// When the event occurred. Sent as whole Unix seconds.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub occurred_at: DateTime<Utc>,

    /// `true` for a "working" signal, `false` for "broken"
    pub ok: bool,
}

impl EventIn {
    /// Create a new event for `topic`
    ///
    /// `occurred_at` is set to the current time.
    pub fn new(topic: &str, ok: bool) -> Self {
        Self {
            topic: topic.to_string(),
            message: String::new(),
            link: String::new(),
            occurred_at: Utc::now(),
            ok,
        }
    }

    /// Create a "working" event
    pub fn working(topic: &str) -> Self {
        Self::new(topic, true)
    }

    /// Create a "broken" event
    pub fn broken(topic: &str) -> Self {
        Self::new(topic, false)
    }

    /// Set the message
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    /// Set the link
    pub fn with_link(mut self, link: &str) -> Self {
        self.link = link.to_string();
        self
    }

    /// Set the time the event occurred
    pub fn with_occurred_at(mut self, time: DateTime<Utc>) -> Self {
        self.occurred_at = time;
        self
    }
}

/// An event as stored by SHOUT!, returned inside [`StateOut`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventOut {
    /// When the event was reported to have occurred
    #[serde(deserialize_with = "ts_seconds_or_epoch")]
    pub occurred_at: DateTime<Utc>,

    /// When SHOUT! received the report
    #[serde(deserialize_with = "ts_seconds_or_epoch")]
    pub reported_at: DateTime<Utc>,

    /// The message given for the event
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,

    /// The link given for the event
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,

    /// Whether the event was reported as OK
    #[serde(deserialize_with = "null_as_default")]
    pub ok: bool,
}

/// Result of posting an event: the state of its topic afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateOut {
    /// The topic name
    pub name: String,
    /// The current state of the topic
    pub state: TopicState,
    /// The state string exactly as SHOUT! sent it
    pub raw_state: String,
    /// The event before this one
    pub previous: EventOut,
    /// The first event ever posted for the topic
    pub first: EventOut,
    /// The most recent event, normally the one just posted
    pub last: EventOut,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StateRaw {
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) previous: EventOut,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) first: EventOut,
    #[serde(deserialize_with = "null_as_default")]
    pub(crate) last: EventOut,
}

impl From<StateRaw> for StateOut {
    fn from(raw: StateRaw) -> Self {
        Self {
            name: raw.name,
            state: parse_state(&raw.state),
            raw_state: raw.state,
            previous: raw.previous,
            first: raw.first,
            last: raw.last,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn ts_seconds_or_epoch<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(chrono::serde::ts_seconds_option::deserialize(deserializer)?.unwrap_or_default())
}

/// An announcement to post to SHOUT!
///
/// Announcements have no working/broken state and are always delivered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnouncementIn {
    /// The topic name
    pub topic: String,
    /// The message to announce
    pub message: String,
    /// A URL relevant to the announcement
    pub link: String,
}

impl AnnouncementIn {
    /// Create a new announcement without a link
    pub fn new(topic: &str, message: &str) -> Self {
        Self {
            topic: topic.to_string(),
            message: message.to_string(),
            link: String::new(),
        }
    }

    /// Set the link
    pub fn with_link(mut self, link: &str) -> Self {
        self.link = link.to_string();
        self
    }
}
