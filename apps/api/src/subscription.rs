/// Subscription policy — pure tier-to-limit mapping, no I/O.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionTier {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    /// Unknown or missing tiers fall back to `Free`.
    pub fn parse(tier: &str) -> Self {
        match tier {
            "basic" => SubscriptionTier::Basic,
            "pro" => SubscriptionTier::Pro,
            "enterprise" => SubscriptionTier::Enterprise,
            _ => SubscriptionTier::Free,
        }
    }

    pub fn max_resumes(self) -> i32 {
        match self {
            SubscriptionTier::Free => 3,
            SubscriptionTier::Basic => 10,
            SubscriptionTier::Pro => 50,
            SubscriptionTier::Enterprise => 999_999,
        }
    }
}

/// True iff the user may create one more resume under their tier's cap.
pub fn can_create_resume(tier: &str, resume_count: i32) -> bool {
    resume_count < SubscriptionTier::parse(tier).max_resumes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_per_tier() {
        let cases = [
            ("free", 3),
            ("basic", 10),
            ("pro", 50),
            ("enterprise", 999_999),
        ];
        for (tier, limit) in cases {
            assert_eq!(SubscriptionTier::parse(tier).max_resumes(), limit, "{tier}");
        }
    }

    #[test]
    fn unknown_tier_behaves_as_free() {
        assert_eq!(SubscriptionTier::parse("platinum"), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::parse(""), SubscriptionTier::Free);
        assert!(can_create_resume("platinum", 2));
        assert!(!can_create_resume("platinum", 3));
    }

    #[test]
    fn rejects_exactly_at_limit() {
        let cases = [
            ("free", 2, true),
            ("free", 3, false),
            ("free", 4, false),
            ("basic", 9, true),
            ("basic", 10, false),
            ("pro", 49, true),
            ("pro", 50, false),
            ("enterprise", 100_000, true),
        ];
        for (tier, count, expected) in cases {
            assert_eq!(
                can_create_resume(tier, count),
                expected,
                "tier={tier} count={count}"
            );
        }
    }

    #[test]
    fn zero_count_always_allowed() {
        for tier in ["free", "basic", "pro", "enterprise"] {
            assert!(can_create_resume(tier, 0));
        }
    }
}
