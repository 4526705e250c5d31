//! The rule registry: ordered tiers and first-match selection.
//!
//! Three fixed tiers surround the user-configured chain: the
//! event-subscription rule runs first, then the user rules in order, then
//! the built-in defaults ending in the always-applicable default-value rule.
//! Selection picks the first applicable rule with remaining budget; whether
//! a matched user rule moves to the front afterwards is governed by the
//! configured [`ReorderPolicy`].

use std::fmt;

use decoy_core::{CallDescriptor, RuleId};
use tracing::debug;

use crate::errors::EngineError;
use crate::rules::{
    AutoFakePropertyRule, CallRule, DefaultValueRule, EventSubscriptionRule, ObjectMemberRule,
    PropertySetterRule, RuleContext, RuleMetadata,
};
use crate::settings::ReorderPolicy;

/// Move the rule at `index` to the front, preserving the relative order of
/// the rules it passes.
///
/// The reordering is this free function rather than registry-internal
/// behavior so the policy stays independently testable.
pub fn promote_to_front(rules: &mut [RuleMetadata], index: usize) {
    if index < rules.len() {
        rules[..=index].rotate_right(1);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Pre,
    User,
    Post,
}

/// Ordered rule collection for one fake.
pub struct RuleRegistry {
    pre_user: Vec<RuleMetadata>,
    user: Vec<RuleMetadata>,
    post_user: Vec<RuleMetadata>,
    policy: ReorderPolicy,
}

impl RuleRegistry {
    /// Create a registry with the built-in pre and post tiers installed.
    #[must_use]
    pub fn new(policy: ReorderPolicy) -> Self {
        Self {
            pre_user: vec![RuleMetadata::new(
                RuleId::new(),
                Box::new(EventSubscriptionRule),
            )],
            user: Vec::new(),
            post_user: vec![
                RuleMetadata::new(RuleId::new(), Box::new(ObjectMemberRule)),
                RuleMetadata::new(RuleId::new(), Box::new(AutoFakePropertyRule)),
                RuleMetadata::new(RuleId::new(), Box::new(PropertySetterRule)),
                RuleMetadata::new(RuleId::new(), Box::new(DefaultValueRule)),
            ],
            policy,
        }
    }

    /// Insert a user rule at the front of the user tier.
    pub fn add_user_rule_front(&mut self, metadata: RuleMetadata) {
        debug!(rule = %metadata.rule().description(), "Adding user rule");
        self.user.insert(0, metadata);
    }

    /// Remove the user rules with the given IDs. Unknown IDs are ignored.
    pub fn remove_user_rules(&mut self, ids: &[RuleId]) {
        self.user.retain(|metadata| !ids.contains(metadata.id()));
    }

    /// The user tier, in selection order.
    pub fn user_rules(&self) -> impl Iterator<Item = &RuleMetadata> {
        self.user.iter()
    }

    /// Number of user rules currently visible.
    #[must_use]
    pub fn user_rule_count(&self) -> usize {
        self.user.len()
    }

    /// Select the first applicable rule with remaining budget and apply it.
    ///
    /// Because the default-value rule is always applicable,
    /// [`EngineError::NoApplicableRule`] is a defensive internal error, not
    /// a user-facing condition.
    pub fn select_and_apply(
        &mut self,
        call: &mut CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Result<(), EngineError> {
        let Some((tier, index)) = self.find_applicable(call, ctx) else {
            return Err(EngineError::NoApplicableRule {
                method: call.method().to_string(),
            });
        };

        let rules = match tier {
            Tier::Pre => &mut self.pre_user,
            Tier::User => &mut self.user,
            Tier::Post => &mut self.post_user,
        };
        let metadata = &mut rules[index];
        metadata.record_call();
        debug!(
            rule = %metadata.rule().description(),
            calls = metadata.calls(),
            "Selected rule"
        );
        metadata.rule_mut().apply(call, ctx)?;

        if tier == Tier::User && self.policy == ReorderPolicy::MoveMatchedToFront {
            promote_to_front(&mut self.user, index);
        }
        Ok(())
    }

    fn find_applicable(
        &self,
        call: &CallDescriptor,
        ctx: &mut RuleContext<'_>,
    ) -> Option<(Tier, usize)> {
        for (tier, rules) in [
            (Tier::Pre, &self.pre_user),
            (Tier::User, &self.user),
            (Tier::Post, &self.post_user),
        ] {
            for (index, metadata) in rules.iter().enumerate() {
                if metadata.has_capacity() && metadata.rule().is_applicable(call, ctx) {
                    return Some((tier, index));
                }
            }
        }
        None
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("user_rule_count", &self.user.len())
            .field("policy", &self.policy)
            .finish()
    }
}
