//! Protocol frame decoding
//!
//! Decodes hex-string tokens scanned out of session logs into structured
//! frames: addressing bytes, service id and, for rejected requests, the
//! negative response code. Decoding is stateless per token and never fails
//! fatally - the worst case is a frame with only addressing bytes populated,
//! which downstream stages treat as "unknown".

use crate::config::AnalyzerConfig;
use crate::types::Frame;

/// Minimum decodable frame length in bytes
const MIN_FRAME_BYTES: usize = 3;

/// Decode a whitespace- or contiguous-hex token into a [`Frame`].
///
/// Non-hex characters are stripped first. A token with an odd number of hex
/// digits or fewer than 3 bytes is represented with `undecodable = true` and
/// whatever bytes were recovered - it still counts toward event totals.
pub fn decode(token: &str, config: &AnalyzerConfig) -> Frame {
    let digits: String = token.chars().filter(|c| c.is_ascii_hexdigit()).collect();

    if digits.len() % 2 != 0 {
        log::debug!("Undecodable frame token (odd digit count): {:?}", token);
        return undecodable(parse_pairs(&digits[..digits.len() - 1]));
    }

    let bytes = parse_pairs(&digits);
    if bytes.len() < MIN_FRAME_BYTES {
        log::debug!("Undecodable frame token ({} bytes): {:?}", bytes.len(), token);
        return undecodable(bytes);
    }

    decode_bytes(bytes, config)
}

/// Decode an already-parsed byte sequence into a [`Frame`]
pub fn decode_bytes(bytes: Vec<u8>, config: &AnalyzerConfig) -> Frame {
    let address_len = config.address_byte_count.min(bytes.len());
    let address_bytes = bytes[..address_len].to_vec();
    let mut rest = &bytes[address_len..];

    // Too short for a service byte: everything is addressing
    if rest.is_empty() {
        return Frame {
            address_bytes,
            service_id: None,
            is_negative_response: false,
            response_code: None,
            payload: Vec::new(),
            undecodable: bytes.len() < MIN_FRAME_BYTES,
        };
    }

    let is_negative_response = rest[0] == config.negative_response_marker;
    let (service_id, response_code) = if is_negative_response {
        rest = &rest[1..];
        let service = rest.first().copied();
        let code = rest.get(1).copied();
        rest = &rest[rest.len().min(2)..];
        (service, code)
    } else {
        let service = Some(rest[0]);
        rest = &rest[1..];
        (service, None)
    };

    Frame {
        address_bytes,
        service_id,
        is_negative_response,
        response_code,
        payload: rest.to_vec(),
        undecodable: false,
    }
}

fn undecodable(bytes: Vec<u8>) -> Frame {
    Frame {
        address_bytes: bytes,
        service_id: None,
        is_negative_response: false,
        response_code: None,
        payload: Vec::new(),
        undecodable: true,
    }
}

fn parse_pairs(digits: &str) -> Vec<u8> {
    digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16).unwrap_or(0) as u8;
            let lo = (pair[1] as char).to_digit(16).unwrap_or(0) as u8;
            (hi << 4) | lo
        })
        .collect()
}

impl Frame {
    /// Re-encode the frame as the byte sequence it was decoded from.
    ///
    /// For any successfully decoded frame this reproduces the original token
    /// byte-for-byte: address bytes, then the negative-response marker and
    /// rejected service id plus response code (or the plain service id), then
    /// the payload.
    pub fn to_bytes(&self, config: &AnalyzerConfig) -> Vec<u8> {
        let mut bytes = self.address_bytes.clone();
        if self.is_negative_response {
            bytes.push(config.negative_response_marker);
        }
        if let Some(service) = self.service_id {
            bytes.push(service);
        }
        if let Some(code) = self.response_code {
            bytes.push(code);
        }
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Uppercase contiguous hex rendering of [`Frame::to_bytes`]
    pub fn to_hex(&self, config: &AnalyzerConfig) -> String {
        self.to_bytes(config)
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect()
    }

    /// Module address derived from the trailing two addressing bytes, when
    /// the header carries one ("00 00 07 D8" addresses module 7D8)
    pub fn derived_address(&self) -> Option<u16> {
        if self.address_bytes.len() < 2 {
            return None;
        }
        let n = self.address_bytes.len();
        let value = u16::from_be_bytes([self.address_bytes[n - 2], self.address_bytes[n - 1]]);
        if value == 0 {
            None
        } else {
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnalyzerConfig {
        AnalyzerConfig::default()
    }

    #[test]
    fn test_negative_response_decode() {
        let frame = decode("00 00 07 D8 7F 22 31", &config());
        assert_eq!(frame.address_bytes, vec![0x00, 0x00, 0x07, 0xD8]);
        assert!(frame.is_negative_response);
        assert_eq!(frame.service_id, Some(0x22));
        assert_eq!(frame.response_code, Some(0x31));
        assert!(frame.payload.is_empty());
        assert!(!frame.undecodable);
    }

    #[test]
    fn test_positive_response_decode() {
        let frame = decode("00 00 07 E8 62 F1 88", &config());
        assert_eq!(frame.address_bytes, vec![0x00, 0x00, 0x07, 0xE8]);
        assert!(!frame.is_negative_response);
        assert_eq!(frame.service_id, Some(0x62));
        assert_eq!(frame.response_code, None);
        assert_eq!(frame.payload, vec![0xF1, 0x88]);
    }

    #[test]
    fn test_contiguous_hex_decode() {
        let frame = decode("000007D87F2231", &config());
        assert!(frame.is_negative_response);
        assert_eq!(frame.service_id, Some(0x22));
        assert_eq!(frame.response_code, Some(0x31));
    }

    #[test]
    fn test_odd_digit_count_is_undecodable() {
        let frame = decode("00 00 07 D", &config());
        assert!(frame.undecodable);
        assert!(frame.service_id.is_none());
    }

    #[test]
    fn test_short_token_is_undecodable() {
        let frame = decode("7F 22", &config());
        assert!(frame.undecodable);
        assert_eq!(frame.address_bytes, vec![0x7F, 0x22]);
        assert!(frame.service_id.is_none());
        assert!(!frame.is_negative_response);
    }

    #[test]
    fn test_exactly_address_bytes() {
        // 4 bytes fill the addressing header; service/response absent
        let frame = decode("00 00 07 E0", &config());
        assert_eq!(frame.address_bytes.len(), 4);
        assert_eq!(frame.service_id, None);
        assert!(!frame.undecodable);
    }

    #[test]
    fn test_round_trip_negative() {
        let cfg = config();
        let frame = decode("00 00 07 D8 7F 22 31", &cfg);
        assert_eq!(frame.to_hex(&cfg), "000007D87F2231");
    }

    #[test]
    fn test_round_trip_with_payload() {
        let cfg = config();
        let original = "000007E862F1885533";
        let frame = decode(original, &cfg);
        assert_eq!(frame.to_hex(&cfg), original);
    }

    #[test]
    fn test_derived_address() {
        let cfg = config();
        let frame = decode("00 00 07 D8 7F 22 31", &cfg);
        assert_eq!(frame.derived_address(), Some(0x7D8));

        let zero = decode("00 00 00 00 22 F1 88", &cfg);
        assert_eq!(zero.derived_address(), None);
    }

    #[test]
    fn test_shorter_address_header() {
        let cfg = AnalyzerConfig::new().with_address_byte_count(2);
        let frame = decode("07 E0 7F 34 33 AA", &cfg);
        assert_eq!(frame.address_bytes, vec![0x07, 0xE0]);
        assert!(frame.is_negative_response);
        assert_eq!(frame.service_id, Some(0x34));
        assert_eq!(frame.response_code, Some(0x33));
        assert_eq!(frame.payload, vec![0xAA]);
        assert_eq!(frame.to_hex(&cfg), "07E07F3433AA");
    }
}
