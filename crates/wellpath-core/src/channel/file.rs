//! The `ChannelFile` capability trait and its in-memory adapter.

use std::collections::BTreeMap;

use super::Channel;
use crate::error::ChannelError;

/// What the engine needs from a log file, independent of its on-disk format.
///
/// The index channel is held apart from the data channels: positions and
/// counts cover data channels only. Name lookups are case-insensitive.
pub trait ChannelFile {
    /// The depth or time channel every other channel is sampled against.
    fn index(&self) -> &Channel;

    /// Number of data channels (excluding the index).
    fn channel_count(&self) -> usize;

    /// Data channel at `position`.
    fn channel_at(&self, position: usize) -> Option<&Channel>;

    /// Mutable data channel by name.
    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel>;

    /// Return the named channel, creating a NaN-filled one of index length
    /// when it does not exist yet.
    fn get_or_create_channel(
        &mut self,
        name: &str,
        unit: &str,
        description: &str,
        format: &str,
    ) -> Result<&mut Channel, ChannelError>;

    /// Header constant or parameter, e.g. `STEP`.
    fn constant(&self, key: &str) -> Option<&str>;

    /// Data channel by name.
    fn channel(&self, name: &str) -> Option<&Channel> {
        (0..self.channel_count())
            .filter_map(|position| self.channel_at(position))
            .find(|channel| channel.is_named(name))
    }

    /// Names of all data channels, in file order.
    fn channel_names(&self) -> Vec<String> {
        (0..self.channel_count())
            .filter_map(|position| self.channel_at(position))
            .map(|channel| channel.name.clone())
            .collect()
    }
}

/// In-memory log file: an index channel, data channels, header constants.
#[derive(Debug, Clone)]
pub struct LogFile {
    index: Channel,
    channels: Vec<Channel>,
    constants: BTreeMap<String, String>,
}

impl LogFile {
    pub fn new(index: Channel) -> Self {
        Self {
            index,
            channels: Vec::new(),
            constants: BTreeMap::new(),
        }
    }

    /// Append a data channel. Its length must match the index.
    pub fn add_channel(&mut self, channel: Channel) -> Result<(), ChannelError> {
        let actual = channel.len();
        if actual != self.index.len() {
            return Err(ChannelError::LengthMismatch {
                name: channel.name,
                expected: self.index.len(),
                actual,
            });
        }
        self.check_name(&channel.name)?;
        if self.position(&channel.name).is_some() {
            return Err(ChannelError::DuplicateName(channel.name));
        }
        self.channels.push(channel);
        Ok(())
    }

    /// Builder-style [`add_channel`](Self::add_channel).
    pub fn with_channel(mut self, channel: Channel) -> Result<Self, ChannelError> {
        self.add_channel(channel)?;
        Ok(self)
    }

    /// Set a header constant. Keys are stored upper-case.
    pub fn set_constant(&mut self, key: &str, value: impl Into<String>) {
        self.constants.insert(key.to_ascii_uppercase(), value.into());
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|channel| channel.is_named(name))
    }

    fn check_name(&self, name: &str) -> Result<(), ChannelError> {
        if name.trim().is_empty() || self.index.is_named(name) {
            return Err(ChannelError::InvalidName(name.to_string()));
        }
        Ok(())
    }
}

impl ChannelFile for LogFile {
    fn index(&self) -> &Channel {
        &self.index
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel_at(&self, position: usize) -> Option<&Channel> {
        self.channels.get(position)
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|channel| channel.is_named(name))
    }

    fn get_or_create_channel(
        &mut self,
        name: &str,
        unit: &str,
        description: &str,
        format: &str,
    ) -> Result<&mut Channel, ChannelError> {
        if let Some(position) = self.position(name) {
            return Ok(&mut self.channels[position]);
        }
        self.check_name(name)?;

        let mut channel = Channel::new(name, unit)
            .described(description)
            .formatted(format);
        channel.set_data(vec![f64::NAN; self.index.len()]);
        self.channels.push(channel);

        let last = self.channels.len() - 1;
        Ok(&mut self.channels[last])
    }

    fn constant(&self, key: &str) -> Option<&str> {
        self.constants
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }
}
