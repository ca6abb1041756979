//! Recursive create/populate orchestration.
//!
//! An [`ExecuteStrategy`] owns the mutable state of one build: the history
//! of instances under construction, the random source, the build log and
//! the nesting depth. The configuration it reads from is shared.

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::blueprint::ConstructorCall;
use crate::capability::{BuildCapability, BuildRequirement, BuildTarget, CapabilitySource};
use crate::config::BuildConfiguration;
use crate::error::{BuildError, BuildFailure, Result};
use crate::generator::{GeneratorContext, TypeCreator};
use crate::history::BuildHistory;
use crate::log::{BuildLog, DefaultBuildLog};
use crate::processor::BuildProcessor;
use crate::types::TypeRef;
use crate::value::{Instance, Value, ValueType};

pub struct ExecuteStrategy {
    configuration: Arc<BuildConfiguration>,
    history: BuildHistory,
    processor: BuildProcessor,
    log: Box<dyn BuildLog>,
    rng: ChaCha8Rng,
    depth: usize,
    // Constructor calls of the objects being populated, innermost last.
    call_stack: Vec<Option<ConstructorCall>>,
}

impl ExecuteStrategy {
    pub fn new(configuration: Arc<BuildConfiguration>) -> Self {
        let rng = seeded_rng(&configuration);
        Self {
            configuration,
            history: BuildHistory::new(),
            processor: BuildProcessor::new(),
            log: Box::new(DefaultBuildLog::new()),
            rng,
            depth: 0,
            call_stack: Vec::new(),
        }
    }

    pub fn with_log(mut self, log: impl BuildLog + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    pub fn with_processor(mut self, processor: BuildProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Switches to `configuration`, reseeding the random source and
    /// discarding all build state.
    pub fn initialize(&mut self, configuration: Arc<BuildConfiguration>) {
        self.rng = seeded_rng(&configuration);
        self.configuration = configuration;
        self.reset();
    }

    pub fn configuration(&self) -> &Arc<BuildConfiguration> {
        &self.configuration
    }

    /// Instances currently under construction.
    pub fn build_chain(&self) -> &BuildHistory {
        &self.history
    }

    pub fn log(&self) -> &dyn BuildLog {
        self.log.as_ref()
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn create(&mut self, type_ref: TypeRef) -> Result<Value> {
        self.build(BuildTarget::Type(type_ref), None)
    }

    /// Creates `type_ref` through the constructor accepting `args`. An empty
    /// slice behaves like [`ExecuteStrategy::create`].
    pub fn create_with(&mut self, type_ref: TypeRef, args: &[Value]) -> Result<Value> {
        self.build(BuildTarget::Type(type_ref), Some(args))
    }

    pub fn create_typed<T: ValueType>(&mut self) -> Result<T> {
        let value = self.create(T::type_ref())?;
        T::from_value(value)
    }

    pub fn create_typed_with<T: ValueType>(&mut self, args: &[Value]) -> Result<T> {
        let value = self.create_with(T::type_ref(), args)?;
        T::from_value(value)
    }

    /// Populates the properties of an existing object.
    pub fn populate(&mut self, instance: Value) -> Result<Value> {
        let instance = match instance {
            Value::Null => return Err(BuildError::ArgumentNull("instance")),
            Value::Object(instance) => instance,
            other => {
                return Err(BuildError::NotSupported(format!(
                    "cannot populate a {} value",
                    other.kind()
                )));
            }
        };
        let target = BuildTarget::Type(instance.type_ref());
        self.run(&target, |strategy| strategy.populate_object(instance))
    }

    pub fn populate_typed<T: ValueType>(&mut self, instance: T) -> Result<T> {
        let value = self.populate(instance.to_value())?;
        T::from_value(value)
    }

    /// Builds and assigns the populatable properties of `instance`, which
    /// must already be on the build chain. Only valid while a build runs,
    /// i.e. from a [`TypeCreator::populate`].
    ///
    /// Properties no build action can create are left unchanged.
    pub fn populate_properties(&mut self, instance: &Instance) -> Result<()> {
        if self.depth == 0 {
            return Err(BuildError::InvalidOperation(
                "populate_properties runs inside a build; call populate instead".to_string(),
            ));
        }

        self.log.populating_instance(instance);
        let result = self.populate_ordered(instance);
        match &result {
            Ok(()) => self.log.populated_instance(instance),
            Err(_) => self.log.failed_populating(instance),
        }
        result
    }

    fn populate_ordered(&mut self, instance: &Instance) -> Result<()> {
        let configuration = Arc::clone(&self.configuration);
        let resolver = configuration.property_resolver();
        let call = self.call_stack.last().cloned().flatten();

        let properties = resolver.ordered_properties(&configuration, instance.type_ref());
        for property in &properties {
            if !resolver.should_populate_property(&configuration, instance, property, call.as_ref())? {
                self.log
                    .ignoring_property(property.type_ref(), property.name(), "ignored");
                debug!(
                    declaring_type = %property.declaring_type(),
                    property = property.name(),
                    "property ignored"
                );
                continue;
            }

            let target = BuildTarget::Property(property);
            let supported = self
                .processor
                .find_capability(&configuration, &self.history, BuildRequirement::Create, &target)
                .is_some();
            if !supported {
                self.log.ignoring_property(
                    property.type_ref(),
                    property.name(),
                    "no build action supports it",
                );
                debug!(
                    declaring_type = %property.declaring_type(),
                    property = property.name(),
                    "property skipped, unsupported type"
                );
                continue;
            }

            self.log.create_property(property.type_ref(), property.name());
            let value = self.build(target, None)?;
            property.set(instance, value)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.history.clear();
        self.call_stack.clear();
        self.log.clear();
        self.depth = 0;
    }

    fn build(&mut self, target: BuildTarget<'_>, args: Option<&[Value]>) -> Result<Value> {
        let args = args.filter(|args| !args.is_empty());
        self.run(&target, |strategy| strategy.build_target(&target, args))
    }

    /// Runs one build step with the depth guard and failure wrapping. The
    /// outermost step also resets the strategy and reports through `tracing`.
    fn run<R>(
        &mut self,
        target: &BuildTarget<'_>,
        step: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        if self.depth > 0 {
            return self.guarded(target, step);
        }

        self.reset();
        let started = Instant::now();
        info!(build = %target, "build started");
        let result = self.guarded(target, step);
        match &result {
            Ok(_) => info!(
                build = %target,
                duration_ms = started.elapsed().as_millis() as u64,
                "build completed"
            ),
            Err(error) => warn!(build = %target, error = %error, "build failed"),
        }
        result
    }

    fn guarded<R>(
        &mut self,
        target: &BuildTarget<'_>,
        step: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let limit = self.configuration.options().max_depth;
        if self.depth >= limit {
            let error = BuildError::RecursionLimit {
                limit,
                type_name: target.type_ref().to_string(),
            };
            return Err(self.wrap_failure(target, error));
        }

        self.depth += 1;
        let result = step(self);
        self.depth -= 1;
        result.map_err(|error| self.wrap_failure(target, error))
    }

    /// Attaches build context to an error the first time it surfaces.
    fn wrap_failure(&mut self, target: &BuildTarget<'_>, error: BuildError) -> BuildError {
        if matches!(error, BuildError::Build(_)) {
            return error;
        }
        self.log.build_failure(&error);
        let failure = BuildFailure::new(
            format!("failed to build {target}: {error}"),
            Some(target.type_ref().to_string()),
            target.reference_name().map(str::to_string),
            self.history.first().cloned(),
            self.log.output(),
            error,
        );
        BuildError::Build(Box::new(failure))
    }

    /// Capability for `target`, consulting the per-entry cache for plain
    /// type targets.
    fn resolve_capability(
        &mut self,
        requirement: BuildRequirement,
        target: &BuildTarget<'_>,
    ) -> Result<BuildCapability> {
        if let BuildTarget::Type(type_ref) = target
            && let Some(cached) = self.history.get_capability(*type_ref)
            && cached.satisfies(requirement)
        {
            return Ok(cached.clone());
        }

        let capability = self.processor.get_build_capability(
            &self.configuration,
            &self.history,
            requirement,
            target,
        )?;
        if let BuildTarget::Type(type_ref) = target {
            self.history.add_capability(*type_ref, capability.clone());
        }
        Ok(capability)
    }

    fn build_target(&mut self, target: &BuildTarget<'_>, args: Option<&[Value]>) -> Result<Value> {
        let capability = self.resolve_capability(BuildRequirement::Create, target)?;
        let configuration = Arc::clone(&self.configuration);
        let type_ref = target.type_ref();

        match capability.source {
            CapabilitySource::CreationRule(index) => {
                let rule = configuration.creation_rules().get(index).ok_or_else(|| {
                    stale_capability(&capability)
                })?;
                self.log.creating_value(type_ref, &capability.implemented_by);
                let context = GeneratorContext::new(&configuration, &self.history, target);
                let value = rule.create(&context)?;
                self.finish(target, value)
            }
            CapabilitySource::ValueGenerator(index) => {
                let generator = configuration.value_generators().get(index).ok_or_else(|| {
                    stale_capability(&capability)
                })?;
                self.log.creating_value(type_ref, &capability.implemented_by);
                let context = GeneratorContext::new(&configuration, &self.history, target);
                let value = generator
                    .generate(&context, &mut self.rng)
                    .map_err(|error| match error {
                        BuildError::Generator { .. } | BuildError::Build(_) => error,
                        other => BuildError::Generator {
                            id: generator.id().to_string(),
                            message: other.to_string(),
                        },
                    })?;
                self.finish(target, value)
            }
            CapabilitySource::TypeCreator(index) => {
                let creator = configuration.type_creators().get(index).ok_or_else(|| {
                    stale_capability(&capability)
                })?;
                self.create_with_creator(&configuration, creator.as_ref(), &capability, target, args)
            }
        }
    }

    fn create_with_creator(
        &mut self,
        configuration: &BuildConfiguration,
        creator: &dyn TypeCreator,
        capability: &BuildCapability,
        target: &BuildTarget<'_>,
        args: Option<&[Value]>,
    ) -> Result<Value> {
        let requested = target.type_ref();
        let build_type = configuration.resolve_build_type(requested);
        if !build_type.same_type(&requested) {
            self.log.mapped_type(requested, build_type);
            debug!(source = %requested, target = %build_type, "type mapped");
        }

        if args.is_none()
            && configuration.options().reuse_circular_references
            && let Some(ancestor) = self.history.find_type(build_type)
        {
            let ancestor = ancestor.clone();
            self.log.circular_reference_detected(build_type);
            debug!(type_name = %build_type, "circular reference reused");
            return Ok(Value::Object(ancestor));
        }

        self.log.creating_type(build_type, &capability.implemented_by);
        let created = self.construct(configuration, creator, capability, target, build_type, args);
        match created {
            Ok(value) => {
                self.log.created_type(build_type);
                self.finish(target, value)
            }
            Err(error) => {
                self.log.failed_type(build_type);
                Err(error)
            }
        }
    }

    fn construct(
        &mut self,
        configuration: &BuildConfiguration,
        creator: &dyn TypeCreator,
        capability: &BuildCapability,
        target: &BuildTarget<'_>,
        build_type: TypeRef,
        args: Option<&[Value]>,
    ) -> Result<Value> {
        let call = match args {
            Some(args)
                if capability.auto_detect_constructor
                    && configuration.types().contains(build_type) =>
            {
                let constructor = configuration.constructor_resolver().resolve(
                    configuration.types(),
                    build_type,
                    Some(args),
                )?;
                Some(ConstructorCall::new(constructor, args.to_vec()))
            }
            Some(_) => None,
            None if capability.auto_detect_constructor => {
                Some(self.constructor_call(configuration, build_type)?)
            }
            None => None,
        };
        let args = call.as_ref().map(ConstructorCall::args).or(args);
        let value = creator.create(self, build_type, target.reference_name(), args, call.as_ref())?;

        match value {
            Value::Object(instance) if capability.auto_populate && capability.supports_populate => {
                self.history.push(instance.clone());
                self.call_stack.push(call);
                let populated = creator.populate(self, Value::Object(instance));
                self.call_stack.pop();
                self.history.pop()?;
                populated
            }
            other => Ok(other),
        }
    }

    /// Picks the constructor for `build_type` and builds its parameters in
    /// execute order, placing each value at its declared position.
    fn constructor_call(
        &mut self,
        configuration: &BuildConfiguration,
        build_type: TypeRef,
    ) -> Result<ConstructorCall> {
        let constructor =
            configuration
                .constructor_resolver()
                .resolve(configuration.types(), build_type, None)?;

        let ordered = configuration
            .parameter_resolver()
            .ordered_parameters(configuration, &constructor);
        let mut values = vec![Value::Null; constructor.parameters().len()];
        for parameter in &ordered {
            self.log
                .create_parameter(parameter.type_ref(), parameter.name());
            let value = self.build(BuildTarget::Parameter(parameter), None)?;
            if let Some(slot) = values.get_mut(parameter.position()) {
                *slot = value;
            }
        }
        Ok(ConstructorCall::new(constructor, values))
    }

    fn populate_object(&mut self, instance: Instance) -> Result<Value> {
        let target = BuildTarget::Type(instance.type_ref());
        self.history.push(instance.clone());
        let result = self.populate_pushed(&target, instance);
        self.history.pop()?;
        result
    }

    fn populate_pushed(&mut self, target: &BuildTarget<'_>, instance: Instance) -> Result<Value> {
        let capability = self.resolve_capability(BuildRequirement::Populate, target)?;
        let configuration = Arc::clone(&self.configuration);
        let CapabilitySource::TypeCreator(index) = capability.source else {
            return Err(BuildError::NotSupported(format!(
                "{} cannot populate {target}",
                capability.implemented_by
            )));
        };
        let creator = configuration
            .type_creators()
            .get(index)
            .ok_or_else(|| stale_capability(&capability))?;

        self.call_stack.push(None);
        let populated = creator.populate(self, Value::Object(instance));
        self.call_stack.pop();
        let populated = populated?;
        self.finish(target, populated)
    }

    /// Turns null into the target's default and runs post-build actions on
    /// everything else.
    fn finish(&mut self, target: &BuildTarget<'_>, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::default_for(target.type_ref()));
        }

        let configuration = Arc::clone(&self.configuration);
        let built_type = match &value {
            Value::Object(instance) => instance.type_ref(),
            _ => target.type_ref(),
        };
        let context =
            GeneratorContext::new(&configuration, &self.history, target).with_type(built_type);
        let mut value = value;
        for action in configuration.post_build_actions() {
            if action.is_match(&context) {
                self.log.post_build_action(built_type, action.id());
                action.execute(&mut value, &context)?;
            }
        }
        Ok(value)
    }
}

fn seeded_rng(configuration: &BuildConfiguration) -> ChaCha8Rng {
    let seed = configuration.options().seed.unwrap_or_else(rand::random);
    ChaCha8Rng::seed_from_u64(seed)
}

fn stale_capability(capability: &BuildCapability) -> BuildError {
    BuildError::InvalidOperation(format!(
        "capability from {} no longer matches the configuration",
        capability.implemented_by
    ))
}
