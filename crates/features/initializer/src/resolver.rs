use crate::directive::{Directive, Target};
use crate::error::InitError;
use crate::registry::{ComponentRegistry, ComponentResult, Extension, Invocable, Module, SideEffect};
use serde::Serialize;
use weld_dom::Document;
use weld_domain::NodeId;

/// Which rule of the resolution order matched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display, strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    ObjectMember,
    Direct,
    Extension,
    SideEffect,
}

/// A resolved callable bound to its calling convention.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'r> {
    Member(&'r Invocable),
    Direct(&'r Invocable),
    Extension(&'r Extension, NodeId),
    SideEffect(&'r SideEffect),
}

impl Resolution<'_> {
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::Member(_) => Strategy::ObjectMember,
            Self::Direct(_) => Strategy::Direct,
            Self::Extension(..) => Strategy::Extension,
            Self::SideEffect(_) => Strategy::SideEffect,
        }
    }

    /// Calls the component with the arguments its convention expects.
    ///
    /// # Errors
    /// Whatever the component reports.
    pub fn invoke(self, doc: &mut Document, directive: &Directive) -> ComponentResult {
        let target = directive.target.element();
        match self {
            Self::Member(member) => member.call(doc, &directive.config, target),
            Self::Direct(entry) => entry.call(doc, &directive.config, target),
            Self::Extension(extension, element) => extension.call(doc, element, &directive.config),
            Self::SideEffect(effect) => effect.call(doc),
        }
    }
}

/// Resolves a directive, first match wins:
///
/// 1. object module with an invocable member named exactly like the component;
/// 2. directly invocable module;
/// 3. extension member, when the directive targets an element;
/// 4. side-effect module, when the directive is global and its config is
///    `null` or `{}`.
///
/// # Errors
/// [`InitError::Unresolved`] when no rule applies.
pub fn resolve<'r>(
    registry: &'r ComponentRegistry,
    directive: &Directive,
) -> Result<Resolution<'r>, InitError> {
    let name = directive.component.as_str();
    let module = registry.module(name);

    match module {
        Some(Module::Object(object)) => {
            if let Some(member) = object.invocable(name) {
                return Ok(Resolution::Member(member));
            }
        },
        Some(Module::Direct(entry)) => return Ok(Resolution::Direct(entry)),
        _ => {},
    }

    if let (Some(extension), Target::Element(element)) = (registry.extension(name), directive.target) {
        return Ok(Resolution::Extension(extension, element));
    }

    if let Some(Module::SideEffect(effect)) = module {
        if directive.target == Target::Global && directive.has_empty_config() {
            return Ok(Resolution::SideEffect(effect));
        }
    }

    Err(InitError::Unresolved { message: unresolved_reason(registry, directive, module).into(), context: None })
}

fn unresolved_reason(registry: &ComponentRegistry, directive: &Directive, module: Option<&Module>) -> String {
    let name = &directive.component;
    match module {
        None if registry.extension(name).is_some() => {
            format!("'{name}' is an element extension but the directive has no target element")
        },
        None => format!("No module or extension registered as '{name}'"),
        Some(Module::Object(_)) => format!("Module '{name}' has no invocable member named '{name}'"),
        Some(Module::SideEffect(_)) if directive.target != Target::Global => {
            format!("Side-effect module '{name}' cannot be bound to an element")
        },
        Some(Module::SideEffect(_)) => {
            format!("Side-effect module '{name}' takes no configuration")
        },
        Some(Module::Direct(_)) => format!("Module '{name}' could not be resolved"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Origin;
    use crate::registry::ObjectModule;
    use serde_json::{Value, json};

    fn ok3(_: &mut Document, _: &Value, _: Option<NodeId>) -> ComponentResult {
        Ok(())
    }

    fn directive(component: &str, config: Value, target: Target) -> Directive {
        Directive {
            component: component.to_owned(),
            config,
            target,
            origin: Origin::Attribute { element: NodeId::new(1) },
        }
    }

    fn element() -> Target {
        Target::Element(NodeId::new(1))
    }

    #[test]
    fn object_member_beats_extension() {
        let registry = ComponentRegistry::builder()
            .object("tooltip", ObjectModule::new().member("tooltip", ok3))
            .extension("tooltip", |_, _, _| Ok(()))
            .build()
            .unwrap();

        let found = resolve(&registry, &directive("tooltip", json!({}), element())).unwrap();
        assert_eq!(found.strategy(), Strategy::ObjectMember);
    }

    #[test]
    fn member_lookup_uses_written_name_after_alias() {
        let registry = ComponentRegistry::builder()
            .object("Vendor_Ui/js/menu", ObjectModule::new().member("menu", ok3))
            .alias("menu", "Vendor_Ui/js/menu")
            .build()
            .unwrap();

        let found = resolve(&registry, &directive("menu", json!({}), element())).unwrap();
        assert_eq!(found.strategy(), Strategy::ObjectMember);

        let by_path = resolve(&registry, &directive("Vendor_Ui/js/menu", json!({}), element()));
        assert!(matches!(by_path, Err(InitError::Unresolved { .. })));
    }

    #[test]
    fn non_callable_member_falls_through_to_extension() {
        let registry = ComponentRegistry::builder()
            .object("gallery", ObjectModule::new().data("gallery", json!({"speed": 3})))
            .extension("gallery", |_, _, _| Ok(()))
            .build()
            .unwrap();

        let found = resolve(&registry, &directive("gallery", json!({}), element())).unwrap();
        assert_eq!(found.strategy(), Strategy::Extension);
    }

    #[test]
    fn direct_module_resolves_for_any_target() {
        let registry = ComponentRegistry::builder().module("app", ok3).build().unwrap();
        for target in [element(), Target::Global] {
            let found = resolve(&registry, &directive("app", json!({"a": 1}), target)).unwrap();
            assert_eq!(found.strategy(), Strategy::Direct);
        }
    }

    #[test]
    fn extension_needs_an_element() {
        let registry = ComponentRegistry::builder().extension("tip", |_, _, _| Ok(())).build().unwrap();
        let err = resolve(&registry, &directive("tip", json!({}), Target::Global)).unwrap_err();
        assert!(err.to_string().contains("no target element"), "{err}");
    }

    #[test]
    fn side_effect_only_for_global_without_config() {
        let registry = ComponentRegistry::builder().side_effect("pageCache", |_| Ok(())).build().unwrap();

        for config in [Value::Null, json!({})] {
            let found = resolve(&registry, &directive("pageCache", config, Target::Global)).unwrap();
            assert_eq!(found.strategy(), Strategy::SideEffect);
        }
        assert!(resolve(&registry, &directive("pageCache", json!({"x": 1}), Target::Global)).is_err());
        assert!(resolve(&registry, &directive("pageCache", json!({}), element())).is_err());
    }

    #[test]
    fn unknown_components_are_unresolved() {
        let registry = ComponentRegistry::builder().build().unwrap();
        let err = resolve(&registry, &directive("ghost", json!({}), element())).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnresolvedComponent);
    }

    #[test]
    fn strategies_display_kebab_case() {
        assert_eq!(Strategy::ObjectMember.to_string(), "object-member");
        assert_eq!(Strategy::SideEffect.to_string(), "side-effect");
    }
}
