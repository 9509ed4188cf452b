//! Point and group object model (component C1).
//!
//! A [`PointObject`] is a periodic bit-field placement request. A
//! [`GroupObjectList`] aggregates several points that must share a period
//! and be placed contiguously. Both are plain data: solver-assigned state
//! (start unit, chosen phase) lives in [`crate::build::Decision`], never on
//! the object itself.

use serde::{Deserialize, Serialize};

/// A single periodic bit-field placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointObject {
    pub name: String,
    pub size_bits: u32,
    pub period: u32,
    pub start_frame: Option<u32>,
    /// Always in bits. [`PointObject::with_offset_bytes`] is the only
    /// ingress path that accepts bytes; the multiply-by-8 happens once,
    /// here.
    pub offset_bits: Option<u32>,
}

impl PointObject {
    pub fn new(name: impl Into<String>, size_bits: u32, period: u32) -> Self {
        Self {
            name: name.into(),
            size_bits,
            period,
            start_frame: None,
            offset_bits: None,
        }
    }

    pub fn with_start_frame(mut self, start_frame: u32) -> Self {
        self.start_frame = Some(start_frame);
        self
    }

    /// Sets a pinned offset supplied in bytes, converting to bits.
    pub fn with_offset_bytes(mut self, offset_bytes: u32) -> Self {
        self.offset_bits = Some(offset_bytes * 8);
        self
    }

    /// Sets a pinned offset already expressed in bits.
    pub fn with_offset_bits(mut self, offset_bits: u32) -> Self {
        self.offset_bits = Some(offset_bits);
        self
    }

    pub fn to_record(&self) -> ObjectRecord {
        ObjectRecord {
            name: self.name.clone(),
            size_bits: self.size_bits,
            period: self.period,
            start_frame: self.start_frame,
            offset_bits: self.offset_bits,
        }
    }
}

/// Flat tabulation record for the Objects sheet (§4.5, table 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub name: String,
    pub size_bits: u32,
    pub period: u32,
    pub start_frame: Option<u32>,
    pub offset_bits: Option<u32>,
}

/// An ordered, non-empty sequence of points sharing a period and,
/// optionally, a start frame and offset, that must sit back-to-back in
/// every frame in which they occur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupObjectList {
    pub name: String,
    pub period: u32,
    pub start_frame: Option<u32>,
    pub offset_bits: Option<u32>,
    pub members: Vec<PointObject>,
}

impl GroupObjectList {
    pub fn members(&self) -> &[PointObject] {
        &self.members
    }
}

/// Builds a [`GroupObjectList`], propagating the group's period,
/// start_frame, and offset onto every member exactly once. Only the first
/// member keeps the group's offset; the rest are forced adjacent by the
/// model builder and so carry no offset of their own.
pub struct GroupBuilder {
    period: u32,
    members: Vec<PointObject>,
    name: String,
    start_frame: Option<u32>,
    offset_bytes: Option<u32>,
}

impl GroupBuilder {
    pub fn new(period: u32, members: Vec<PointObject>) -> Self {
        Self {
            period,
            members,
            name: "_".to_string(),
            start_frame: None,
            offset_bytes: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn start_frame(mut self, start_frame: u32) -> Self {
        self.start_frame = Some(start_frame);
        self
    }

    pub fn offset_bytes(mut self, offset_bytes: u32) -> Self {
        self.offset_bytes = Some(offset_bytes);
        self
    }

    pub fn build(self) -> GroupObjectList {
        let offset_bits = self.offset_bytes.map(|b| b * 8);
        let mut members = self.members;
        for (i, member) in members.iter_mut().enumerate() {
            member.period = self.period;
            member.start_frame = self.start_frame;
            member.offset_bits = if i == 0 { offset_bits } else { None };
        }
        GroupObjectList {
            name: self.name,
            period: self.period,
            start_frame: self.start_frame,
            offset_bits,
            members,
        }
    }
}

/// Tagged input variant distinguishing a lone point from a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointOrGroup {
    Point(PointObject),
    Group(GroupObjectList),
}

impl From<PointObject> for PointOrGroup {
    fn from(point: PointObject) -> Self {
        PointOrGroup::Point(point)
    }
}

impl From<GroupObjectList> for PointOrGroup {
    fn from(group: GroupObjectList) -> Self {
        PointOrGroup::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_bytes_converted_to_bits_once() {
        let p = PointObject::new("A", 32, 32).with_offset_bytes(8);
        assert_eq!(p.offset_bits, Some(64));
    }

    #[test]
    fn group_propagates_period_start_frame_and_blanks_trailing_offsets() {
        let a = PointObject::new("A", 16, 1);
        let b = PointObject::new("B", 32, 1);
        let c = PointObject::new("C", 8, 1);
        let group = GroupBuilder::new(16, vec![a, b, c])
            .name("group_ABC")
            .start_frame(1)
            .offset_bytes(8)
            .build();

        assert_eq!(group.members[0].offset_bits, Some(64));
        assert_eq!(group.members[1].offset_bits, None);
        assert_eq!(group.members[2].offset_bits, None);
        for member in &group.members {
            assert_eq!(member.period, 16);
            assert_eq!(member.start_frame, Some(1));
        }
    }

    #[test]
    fn group_build_is_idempotent_given_same_inputs() {
        let make = || {
            GroupBuilder::new(
                8,
                vec![PointObject::new("X", 16, 1), PointObject::new("Y", 8, 1)],
            )
            .offset_bytes(32)
            .build()
        };
        assert_eq!(make(), make());
    }
}
