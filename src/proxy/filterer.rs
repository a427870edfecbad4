//! Attribute-based candidate filtering
//!
//! Pure reduction of a candidate set by allowed protocols and allowed
//! anonymity levels. An empty allow-list means no restriction on that
//! dimension. Candidates whose anonymity is still unknown pass the
//! anonymity check; the validator classifies them later.

use std::collections::HashSet;

use crate::proxy::models::{Anonymity, Candidate, Protocol};

/// Reduce `candidates` to the subset matching the allow-lists.
pub fn filter(
    candidates: HashSet<Candidate>,
    protocols: &[Protocol],
    anonymities: &[Anonymity],
) -> HashSet<Candidate> {
    candidates
        .into_iter()
        .filter(|candidate| protocols.is_empty() || protocols.contains(&candidate.protocol))
        .filter(|candidate| {
            anonymities.is_empty()
                || candidate
                    .anonymity
                    .map_or(true, |anonymity| anonymities.contains(&anonymity))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> HashSet<Candidate> {
        HashSet::from([
            Candidate::new(Protocol::Http, "1.2.3.4", 8080),
            Candidate::new(Protocol::Socks5, "5.6.7.8", 1080)
                .with_anonymity(Anonymity::Transparent),
            Candidate::new(Protocol::Https, "9.9.9.9", 443).with_anonymity(Anonymity::Elite),
        ])
    }

    #[test]
    fn test_empty_allow_lists_pass_everything_through() {
        let input = candidates();
        let output = filter(input.clone(), &[], &[]);
        assert_eq!(output, input);
    }

    #[test]
    fn test_protocol_filter() {
        let output = filter(candidates(), &[Protocol::Http], &[]);
        assert_eq!(output.len(), 1);
        assert!(output.iter().all(|c| c.protocol == Protocol::Http));
    }

    #[test]
    fn test_anonymity_filter_keeps_unknown() {
        let output = filter(candidates(), &[], &[Anonymity::Elite]);
        // The elite candidate and the unknown-anonymity candidate both
        // survive; the transparent one is rejected.
        assert_eq!(output.len(), 2);
        assert!(!output
            .iter()
            .any(|c| c.anonymity == Some(Anonymity::Transparent)));
    }

    #[test]
    fn test_combined_filters() {
        let output = filter(
            candidates(),
            &[Protocol::Socks5, Protocol::Https],
            &[Anonymity::Elite],
        );
        assert_eq!(output.len(), 1);
        assert!(output.iter().all(|c| c.protocol == Protocol::Https));
    }

    #[test]
    fn test_output_is_subset_of_input() {
        let input = candidates();
        let output = filter(input.clone(), &[Protocol::Socks4], &[]);
        assert!(output.is_subset(&input));
        assert!(output.is_empty());
    }
}
