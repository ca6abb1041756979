//! Selection of the build capability for a target.
//!
//! Each [`BuildAction`] answers whether it can build a target; the
//! [`BuildProcessor`] keeps the highest-priority answer that satisfies the
//! requested [`BuildRequirement`].

use crate::capability::{BuildCapability, BuildRequirement, BuildTarget, CapabilitySource};
use crate::config::BuildConfiguration;
use crate::error::{BuildError, Result};
use crate::generator::GeneratorContext;
use crate::history::BuildHistory;

pub const CREATION_RULE_PRIORITY: i32 = 3000;
pub const VALUE_GENERATOR_PRIORITY: i32 = 2000;
pub const TYPE_CREATOR_PRIORITY: i32 = 1000;

pub trait BuildAction: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32;

    /// Capability for `target`, or `None` when nothing in this action
    /// matches.
    fn capability(
        &self,
        configuration: &BuildConfiguration,
        history: &BuildHistory,
        target: &BuildTarget<'_>,
    ) -> Option<BuildCapability>;
}

/// Index of the highest priority, keeping the earliest on ties.
fn best_match(candidates: impl Iterator<Item = (usize, i32)>) -> Option<usize> {
    candidates
        .fold(None, |best: Option<(usize, i32)>, (index, priority)| match best {
            Some((_, current)) if current >= priority => best,
            _ => Some((index, priority)),
        })
        .map(|(index, _)| index)
}

#[derive(Debug, Default)]
pub struct CreationRuleBuildAction;

impl BuildAction for CreationRuleBuildAction {
    fn name(&self) -> &'static str {
        "creation-rule"
    }

    fn priority(&self) -> i32 {
        CREATION_RULE_PRIORITY
    }

    fn capability(
        &self,
        configuration: &BuildConfiguration,
        history: &BuildHistory,
        target: &BuildTarget<'_>,
    ) -> Option<BuildCapability> {
        let context = GeneratorContext::new(configuration, history, target);
        let rules = configuration.creation_rules();
        let index = best_match(
            rules
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.is_match(&context))
                .map(|(index, rule)| (index, rule.priority())),
        )?;
        Some(BuildCapability::create_only(
            rules[index].description(),
            CapabilitySource::CreationRule(index),
        ))
    }
}

#[derive(Debug, Default)]
pub struct ValueGeneratorBuildAction;

impl BuildAction for ValueGeneratorBuildAction {
    fn name(&self) -> &'static str {
        "value-generator"
    }

    fn priority(&self) -> i32 {
        VALUE_GENERATOR_PRIORITY
    }

    fn capability(
        &self,
        configuration: &BuildConfiguration,
        history: &BuildHistory,
        target: &BuildTarget<'_>,
    ) -> Option<BuildCapability> {
        let context = GeneratorContext::new(configuration, history, target);
        let generators = configuration.value_generators();
        let index = best_match(
            generators
                .iter()
                .enumerate()
                .filter(|(_, generator)| generator.is_match(&context))
                .map(|(index, generator)| (index, generator.priority())),
        )?;
        Some(BuildCapability::create_only(
            generators[index].id(),
            CapabilitySource::ValueGenerator(index),
        ))
    }
}

/// Asks type creators about the mapped build type of the target.
#[derive(Debug, Default)]
pub struct TypeCreatorBuildAction;

impl BuildAction for TypeCreatorBuildAction {
    fn name(&self) -> &'static str {
        "type-creator"
    }

    fn priority(&self) -> i32 {
        TYPE_CREATOR_PRIORITY
    }

    fn capability(
        &self,
        configuration: &BuildConfiguration,
        history: &BuildHistory,
        target: &BuildTarget<'_>,
    ) -> Option<BuildCapability> {
        let build_type = configuration.resolve_build_type(target.type_ref());
        let context =
            GeneratorContext::new(configuration, history, target).with_type(build_type);
        let creators = configuration.type_creators();
        let index = best_match(
            creators
                .iter()
                .enumerate()
                .filter(|(_, creator)| creator.is_match(&context))
                .map(|(index, creator)| (index, creator.priority())),
        )?;
        let creator = &creators[index];
        Some(BuildCapability {
            supports_create: creator.supports_create(),
            supports_populate: creator.supports_populate(),
            auto_detect_constructor: creator.auto_detect_constructor(),
            auto_populate: creator.auto_populate(),
            implemented_by: creator.id().to_string(),
            source: CapabilitySource::TypeCreator(index),
        })
    }
}

pub struct BuildProcessor {
    actions: Vec<Box<dyn BuildAction>>,
}

impl BuildProcessor {
    pub fn new() -> Self {
        Self::with_actions(vec![
            Box::new(CreationRuleBuildAction),
            Box::new(ValueGeneratorBuildAction),
            Box::new(TypeCreatorBuildAction),
        ])
    }

    pub fn with_actions(actions: Vec<Box<dyn BuildAction>>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Box<dyn BuildAction>] {
        &self.actions
    }

    /// Best capability satisfying `requirement`, or `None`.
    pub fn find_capability(
        &self,
        configuration: &BuildConfiguration,
        history: &BuildHistory,
        requirement: BuildRequirement,
        target: &BuildTarget<'_>,
    ) -> Option<BuildCapability> {
        let mut best: Option<(i32, BuildCapability)> = None;
        for action in &self.actions {
            let Some(capability) = action.capability(configuration, history, target) else {
                continue;
            };
            if !capability.satisfies(requirement) {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|(priority, _)| action.priority() > *priority)
            {
                best = Some((action.priority(), capability));
            }
        }
        best.map(|(_, capability)| capability)
    }

    pub fn get_build_capability(
        &self,
        configuration: &BuildConfiguration,
        history: &BuildHistory,
        requirement: BuildRequirement,
        target: &BuildTarget<'_>,
    ) -> Result<BuildCapability> {
        self.find_capability(configuration, history, requirement, target)
            .ok_or_else(|| BuildError::NotSupported(format!("no build action can {requirement} {target}")))
    }
}

impl Default for BuildProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;
    use crate::config::ConfigurationBuilder;
    use crate::generator::ValueGenerator;
    use crate::rules::CreationRule;
    use crate::types::TypeRef;
    use crate::value::Value;

    struct FixedAction {
        name: &'static str,
        priority: i32,
        populate: bool,
    }

    impl BuildAction for FixedAction {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn capability(
            &self,
            _configuration: &BuildConfiguration,
            _history: &BuildHistory,
            _target: &BuildTarget<'_>,
        ) -> Option<BuildCapability> {
            let mut capability =
                BuildCapability::create_only(self.name, CapabilitySource::ValueGenerator(0));
            capability.supports_populate = self.populate;
            Some(capability)
        }
    }

    struct TextGenerator(&'static str, i32);

    impl ValueGenerator for TextGenerator {
        fn id(&self) -> &'static str {
            self.0
        }

        fn priority(&self) -> i32 {
            self.1
        }

        fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
            ctx.type_ref.is::<String>()
        }

        fn generate(&self, _ctx: &GeneratorContext<'_>, _rng: &mut dyn RngCore) -> Result<Value> {
            Ok(Value::Text(self.0.to_string()))
        }
    }

    fn fixed(name: &'static str, priority: i32, populate: bool) -> Box<dyn BuildAction> {
        Box::new(FixedAction {
            name,
            priority,
            populate,
        })
    }

    #[test]
    fn first_registered_action_wins_priority_ties() {
        let configuration = ConfigurationBuilder::new().build();
        let history = BuildHistory::new();
        let target = BuildTarget::Type(TypeRef::of::<String>());
        let processor = BuildProcessor::with_actions(vec![
            fixed("low", 1, false),
            fixed("first", 5, false),
            fixed("second", 5, false),
        ]);

        let capability = processor
            .get_build_capability(&configuration, &history, BuildRequirement::Create, &target)
            .expect("capability");
        assert_eq!(capability.implemented_by, "first");
    }

    #[test]
    fn requirement_filters_candidates_before_priority() {
        let configuration = ConfigurationBuilder::new().build();
        let history = BuildHistory::new();
        let target = BuildTarget::Type(TypeRef::of::<String>());
        let processor =
            BuildProcessor::with_actions(vec![fixed("create", 10, false), fixed("both", 1, true)]);

        let capability = processor
            .get_build_capability(&configuration, &history, BuildRequirement::Populate, &target)
            .expect("capability");
        assert_eq!(capability.implemented_by, "both");
    }

    #[test]
    fn creation_rule_beats_value_generator() {
        let configuration = ConfigurationBuilder::new()
            .value_generator(TextGenerator("text", 0))
            .add_creation_rule(CreationRule::for_type("fixed".to_string(), 1))
            .build();
        let history = BuildHistory::new();
        let target = BuildTarget::Type(TypeRef::of::<String>());

        let capability = BuildProcessor::new()
            .get_build_capability(&configuration, &history, BuildRequirement::Create, &target)
            .expect("capability");
        assert_eq!(capability.source, CapabilitySource::CreationRule(0));
    }

    #[test]
    fn generators_with_equal_priority_keep_registration_order() {
        let configuration = ConfigurationBuilder::new()
            .value_generator(TextGenerator("early", 2))
            .value_generator(TextGenerator("late", 2))
            .value_generator(TextGenerator("lower", 1))
            .build();
        let history = BuildHistory::new();
        let target = BuildTarget::Type(TypeRef::of::<String>());

        let capability = BuildProcessor::new()
            .get_build_capability(&configuration, &history, BuildRequirement::Create, &target)
            .expect("capability");
        assert_eq!(capability.implemented_by, "early");
        assert!(!capability.supports_populate);
    }

    #[test]
    fn empty_configuration_is_not_supported() {
        let configuration = ConfigurationBuilder::new().build();
        let history = BuildHistory::new();
        let target = BuildTarget::Type(TypeRef::of::<String>());

        let result = BuildProcessor::new().get_build_capability(
            &configuration,
            &history,
            BuildRequirement::Create,
            &target,
        );
        assert!(matches!(result, Err(BuildError::NotSupported(_))));
    }
}
