// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Lesser General Public License that can be found
// in the LICENSE file.

use std::fmt;

use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket, StringData};

/// Topic name used in Publish packets and as Will Topic.
///
/// The Topic Name in a PUBLISH Packet MUST NOT contain wildcard
/// characters [MQTT-3.3.2-2] and must not be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PubTopic(StringData);

impl PubTopic {
    /// Create a new topic name.
    ///
    /// # Errors
    ///
    /// Returns error if `topic` is empty, too long or contains
    /// wildcard characters.
    pub fn new(topic: &str) -> Result<Self, EncodeError> {
        if topic.is_empty() || topic.contains(['#', '+']) {
            return Err(EncodeError::InvalidTopic);
        }
        Ok(Self(StringData::from(topic)?))
    }

    /// Get byte length in packet.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.0.bytes()
    }
}

impl AsRef<str> for PubTopic {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl fmt::Display for PubTopic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DecodePacket for PubTopic {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let data = StringData::decode(ba)?;
        if data.is_empty() || data.as_ref().contains(['#', '+']) {
            return Err(DecodeError::InvalidTopic);
        }
        Ok(Self(data))
    }
}

impl EncodePacket for PubTopic {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        self.0.encode(buf)
    }
}

/// Topic filter used in Subscribe/Unsubscribe packets.
///
/// A filter may contain the `+` single-level wildcard, one per level, and
/// the `#` multi-level wildcard as its last level [MQTT-4.7.1-2].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubTopic(StringData);

impl SubTopic {
    /// Create a new topic filter.
    ///
    /// # Errors
    ///
    /// Returns error if `filter` is empty, too long, or misuses wildcards.
    pub fn new(filter: &str) -> Result<Self, EncodeError> {
        validate_sub_topic(filter).map_err(|_| EncodeError::InvalidTopic)?;
        Ok(Self(StringData::from(filter)?))
    }

    /// Get byte length in packet.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.0.bytes()
    }
}

impl AsRef<str> for SubTopic {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl fmt::Display for SubTopic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DecodePacket for SubTopic {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let data = StringData::decode(ba)?;
        validate_sub_topic(data.as_ref())?;
        Ok(Self(data))
    }
}

impl EncodePacket for SubTopic {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        self.0.encode(buf)
    }
}

fn validate_sub_topic(filter: &str) -> Result<(), DecodeError> {
    if filter.is_empty() {
        return Err(DecodeError::InvalidTopic);
    }
    let levels: Vec<&str> = filter.split('/').collect();
    for (index, level) in levels.iter().enumerate() {
        if level.contains('+') && *level != "+" {
            return Err(DecodeError::InvalidTopic);
        }
        if level.contains('#') && (*level != "#" || index != levels.len() - 1) {
            return Err(DecodeError::InvalidTopic);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pub_topic_rejects_wildcards() {
        assert!(PubTopic::new("a/b").is_ok());
        assert!(PubTopic::new("a/+/b").is_err());
        assert!(PubTopic::new("a/#").is_err());
        assert!(PubTopic::new("").is_err());
    }

    #[test]
    fn test_sub_topic_wildcard_rules() {
        assert!(SubTopic::new("a/+/b").is_ok());
        assert!(SubTopic::new("a/#").is_ok());
        assert!(SubTopic::new("#").is_ok());
        assert!(SubTopic::new("a/b#").is_err());
        assert!(SubTopic::new("a/#/b").is_err());
        assert!(SubTopic::new("a+/b").is_err());
    }
}
