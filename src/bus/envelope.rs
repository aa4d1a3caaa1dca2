//! JSON encode/decode helpers for the envelopes carried over the bus.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bus::BusError;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, BusError> {
    serde_json::to_vec(value).map_err(|e| BusError::Publish(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Announcement;

    #[test]
    fn announcement_round_trips_through_encode_decode() {
        let announcement = Announcement { node: "node-A".into(), application: "demo".into() };
        let encoded = encode(&announcement).unwrap();
        let decoded: Announcement = decode(&encoded).unwrap();
        assert_eq!(announcement, decoded);
    }
}
