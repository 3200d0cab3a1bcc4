//! Component definitions and how parent/child definitions combine.
//!
//! A [`ComponentOptions`] record is the canonical component definition: state
//! factory, prop declarations, computed getters, watch entries, lifecycle
//! hooks, registered child components. Merging folds `extends` and `mixins`
//! into the parent first, then combines field by field under per-key
//! strategies; unknown keys travel through the `custom` table under the
//! default child-wins strategy.

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashSet;
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::dom::NodeId;
use crate::error::{warn, CapturedError};
use crate::instance::Instance;
use crate::render::NodeFactory;
use crate::value::{MapRef, Value};
use crate::vnode::VNode;

pub type DataFn = Rc<dyn Fn(&Instance) -> MapRef>;
pub type ComputedFn = Rc<dyn Fn(&Instance) -> Value>;
pub type MethodFn = Rc<dyn Fn(&Instance, &[Value]) -> Value>;
pub type HookFn = Rc<dyn Fn(&Instance)>;
pub type RenderFn = Rc<dyn Fn(&Instance, &NodeFactory) -> Rc<VNode>>;
pub type WatchCallback = Rc<dyn Fn(&Instance, Value, Value)>;
pub type ErrorCapturedFn = Rc<dyn Fn(&Instance, &CapturedError) -> bool>;
pub type ProvideFn = Rc<dyn Fn(&Instance) -> MapRef>;

/// Which `Value` shapes a prop accepts. `Float` accepts integers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PropType {
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
}

impl PropType {
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (PropType::Bool, Value::Bool(_)) => true,
            (PropType::Int, Value::Int(_)) => true,
            (PropType::Float, Value::Float(_)) | (PropType::Float, Value::Int(_)) => true,
            (PropType::Str, Value::Str(_)) => true,
            (PropType::List, Value::List(_)) => true,
            (PropType::Map, Value::Map(_)) => true,
            _ => false,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PropType::Bool => "bool",
            PropType::Int => "int",
            PropType::Float => "float",
            PropType::Str => "string",
            PropType::List => "list",
            PropType::Map => "map",
        }
    }
}

#[derive(Clone)]
pub enum PropDefault {
    Value(Value),
    /// Container defaults must come from a factory so instances don't share
    /// one map.
    Factory(Rc<dyn Fn(&Instance) -> Value>),
}

/// A normalized prop declaration. A prop declared by bare name is
/// `PropSpec::default()`: any type, optional, no default.
#[derive(Clone, Default)]
pub struct PropSpec {
    pub ty: Option<PropType>,
    pub required: bool,
    pub default: Option<PropDefault>,
}

impl PropSpec {
    pub fn typed(ty: PropType) -> Self {
        PropSpec {
            ty: Some(ty),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(PropDefault::Value(value.into()));
        self
    }

    pub fn with_default_factory(mut self, f: impl Fn(&Instance) -> Value + 'static) -> Self {
        self.default = Some(PropDefault::Factory(Rc::new(f)));
        self
    }
}

#[derive(Clone)]
pub enum WatchHandler {
    Fn(WatchCallback),
    /// Resolved against the methods table when the watcher fires.
    Method(String),
}

#[derive(Clone)]
pub struct WatchEntry {
    pub handler: WatchHandler,
    pub deep: bool,
    pub immediate: bool,
    pub sync: bool,
}

impl WatchEntry {
    pub fn new(cb: impl Fn(&Instance, Value, Value) + 'static) -> Self {
        WatchEntry {
            handler: WatchHandler::Fn(Rc::new(cb)),
            deep: false,
            immediate: false,
            sync: false,
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        WatchEntry {
            handler: WatchHandler::Method(name.into()),
            deep: false,
            immediate: false,
            sync: false,
        }
    }

    pub fn deep(mut self) -> Self {
        self.deep = true;
        self
    }

    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    pub fn sync(mut self) -> Self {
        self.sync = true;
        self
    }
}

/// `inject` entry, normalized: a bare name becomes `{ from: name }`.
#[derive(Clone)]
pub struct InjectSpec {
    pub from: Rc<str>,
    pub default: Option<Value>,
}

#[derive(Clone)]
pub enum ProvideDecl {
    Map(MapRef),
    Factory(ProvideFn),
}

impl ProvideDecl {
    pub(crate) fn resolve(&self, vm: &Instance) -> MapRef {
        match self {
            ProvideDecl::Map(map) => map.clone(),
            ProvideDecl::Factory(f) => f(vm),
        }
    }
}

/// Registered child components, with prototype-style fallback to the parent
/// registry built by option merging.
pub struct AssetRegistry {
    own: RefCell<IndexMap<String, Rc<ComponentOptions>>>,
    parent: Option<Rc<AssetRegistry>>,
}

impl AssetRegistry {
    pub fn new(parent: Option<Rc<AssetRegistry>>) -> Rc<Self> {
        Rc::new(AssetRegistry {
            own: RefCell::new(IndexMap::new()),
            parent,
        })
    }

    pub fn register(&self, id: &str, options: Rc<ComponentOptions>) {
        validate_component_name(id);
        self.own.borrow_mut().insert(id.to_string(), options);
    }

    fn own_entries(&self) -> IndexMap<String, Rc<ComponentOptions>> {
        self.own.borrow().clone()
    }

    /// Look up an asset by id, then camel-cased, then Pascal-cased, then up
    /// the parent chain.
    pub fn resolve(&self, id: &str) -> Option<Rc<ComponentOptions>> {
        {
            let own = self.own.borrow();
            if let Some(hit) = own.get(id) {
                return Some(hit.clone());
            }
            let camel = camelize(id);
            if let Some(hit) = own.get(&camel) {
                return Some(hit.clone());
            }
            if let Some(hit) = own.get(&capitalize(&camel)) {
                return Some(hit.clone());
            }
        }
        self.parent.as_ref().and_then(|p| p.resolve(id))
    }
}

/// Lifecycle hook arrays. Merging concatenates parent-then-child and
/// dedupes, preserving order.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub before_create: Vec<HookFn>,
    pub created: Vec<HookFn>,
    pub before_mount: Vec<HookFn>,
    pub mounted: Vec<HookFn>,
    pub before_update: Vec<HookFn>,
    pub updated: Vec<HookFn>,
    pub before_destroy: Vec<HookFn>,
    pub destroyed: Vec<HookFn>,
    pub activated: Vec<HookFn>,
    pub deactivated: Vec<HookFn>,
}

/// The component definition record.
#[derive(Clone)]
pub struct ComponentOptions {
    pub name: Option<String>,
    pub data: Option<DataFn>,
    pub props: IndexMap<String, PropSpec>,
    /// Only meaningful at instance creation (root instances and tests).
    pub props_data: IndexMap<String, Value>,
    pub computed: IndexMap<String, ComputedFn>,
    pub methods: IndexMap<String, MethodFn>,
    pub watch: IndexMap<String, Vec<WatchEntry>>,
    pub render: Option<RenderFn>,
    pub components: Rc<AssetRegistry>,
    pub provide: Option<ProvideDecl>,
    pub inject: IndexMap<String, InjectSpec>,
    pub mixins: Vec<Rc<ComponentOptions>>,
    pub extends: Option<Rc<ComponentOptions>>,
    pub hooks: LifecycleHooks,
    pub error_captured: Vec<ErrorCapturedFn>,
    /// Only meaningful at instance creation.
    pub el: Option<NodeId>,
    pub scope_id: Option<String>,
    /// Unknown option keys, merged under the default strategy.
    pub custom: IndexMap<String, Value>,
}

impl Default for ComponentOptions {
    fn default() -> Self {
        ComponentOptions {
            name: None,
            data: None,
            props: IndexMap::new(),
            props_data: IndexMap::new(),
            computed: IndexMap::new(),
            methods: IndexMap::new(),
            watch: IndexMap::new(),
            render: None,
            components: AssetRegistry::new(None),
            provide: None,
            inject: IndexMap::new(),
            mixins: Vec::new(),
            extends: None,
            hooks: LifecycleHooks::default(),
            error_captured: Vec::new(),
            el: None,
            scope_id: None,
            custom: IndexMap::new(),
        }
    }
}

impl ComponentOptions {
    pub fn builder() -> ComponentOptionsBuilder {
        ComponentOptionsBuilder {
            options: ComponentOptions::default(),
        }
    }
}

/// Fluent construction of a [`ComponentOptions`] record. Every method maps
/// to one option key; normalization (bare prop names, bare inject names)
/// happens here.
pub struct ComponentOptionsBuilder {
    options: ComponentOptions,
}

impl ComponentOptionsBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        validate_component_name(&name);
        self.options.name = Some(name);
        self
    }

    pub fn data(mut self, f: impl Fn(&Instance) -> MapRef + 'static) -> Self {
        self.options.data = Some(Rc::new(f));
        self
    }

    /// Declare a prop by bare name: any type, optional.
    pub fn prop(mut self, name: &str) -> Self {
        self.options
            .props
            .insert(name.to_string(), PropSpec::default());
        self
    }

    pub fn prop_spec(mut self, name: &str, spec: PropSpec) -> Self {
        self.options.props.insert(name.to_string(), spec);
        self
    }

    /// Initial prop values, only honored at instance creation.
    pub fn prop_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.options
            .props_data
            .insert(name.to_string(), value.into());
        self
    }

    pub fn computed(mut self, name: &str, f: impl Fn(&Instance) -> Value + 'static) -> Self {
        self.options.computed.insert(name.to_string(), Rc::new(f));
        self
    }

    pub fn method(
        mut self,
        name: &str,
        f: impl Fn(&Instance, &[Value]) -> Value + 'static,
    ) -> Self {
        self.options.methods.insert(name.to_string(), Rc::new(f));
        self
    }

    pub fn watch(self, path: &str, cb: impl Fn(&Instance, Value, Value) + 'static) -> Self {
        self.watch_entry(path, WatchEntry::new(cb))
    }

    pub fn watch_entry(mut self, path: &str, entry: WatchEntry) -> Self {
        self.options
            .watch
            .entry(path.to_string())
            .or_insert_with(Vec::new)
            .push(entry);
        self
    }

    pub fn render(mut self, f: impl Fn(&Instance, &NodeFactory) -> Rc<VNode> + 'static) -> Self {
        self.options.render = Some(Rc::new(f));
        self
    }

    pub fn component(self, id: &str, options: ComponentOptions) -> Self {
        self.options.components.register(id, Rc::new(options));
        self
    }

    pub fn component_shared(self, id: &str, options: Rc<ComponentOptions>) -> Self {
        self.options.components.register(id, options);
        self
    }

    pub fn provide(mut self, map: MapRef) -> Self {
        self.options.provide = Some(ProvideDecl::Map(map));
        self
    }

    pub fn provide_fn(mut self, f: impl Fn(&Instance) -> MapRef + 'static) -> Self {
        self.options.provide = Some(ProvideDecl::Factory(Rc::new(f)));
        self
    }

    /// Inject by bare name: resolves from the provider key of the same name.
    pub fn inject(mut self, name: &str) -> Self {
        self.options.inject.insert(
            name.to_string(),
            InjectSpec {
                from: Rc::from(name),
                default: None,
            },
        );
        self
    }

    pub fn inject_from(mut self, name: &str, from: &str, default: Option<Value>) -> Self {
        self.options.inject.insert(
            name.to_string(),
            InjectSpec {
                from: Rc::from(from),
                default,
            },
        );
        self
    }

    pub fn mixin(mut self, options: ComponentOptions) -> Self {
        self.options.mixins.push(Rc::new(options));
        self
    }

    pub fn extends(mut self, options: ComponentOptions) -> Self {
        self.options.extends = Some(Rc::new(options));
        self
    }

    pub fn before_create(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.before_create, f)
    }

    pub fn created(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.created, f)
    }

    pub fn before_mount(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.before_mount, f)
    }

    pub fn mounted(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.mounted, f)
    }

    pub fn before_update(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.before_update, f)
    }

    pub fn updated(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.updated, f)
    }

    pub fn before_destroy(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.before_destroy, f)
    }

    pub fn destroyed(self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hook(|h| &mut h.destroyed, f)
    }

    pub fn error_captured(
        mut self,
        f: impl Fn(&Instance, &CapturedError) -> bool + 'static,
    ) -> Self {
        self.options.error_captured.push(Rc::new(f));
        self
    }

    pub fn el(mut self, el: NodeId) -> Self {
        self.options.el = Some(el);
        self
    }

    pub fn scope_id(mut self, id: impl Into<String>) -> Self {
        self.options.scope_id = Some(id.into());
        self
    }

    /// Unknown option key passthrough.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.custom.insert(key.to_string(), value.into());
        self
    }

    fn hook(
        mut self,
        pick: impl FnOnce(&mut LifecycleHooks) -> &mut Vec<HookFn>,
        f: impl Fn(&Instance) + 'static,
    ) -> Self {
        pick(&mut self.options.hooks).push(Rc::new(f));
        self
    }

    pub fn build(self) -> ComponentOptions {
        self.options
    }
}

// ---------------------------------------------------------------------------
// merging
// ---------------------------------------------------------------------------

/// Merge a parent and child definition into a new record. `vm_creation`
/// permits the `el`/`props_data` keys; outside instance creation they warn
/// and are dropped.
pub fn merge_options(
    parent: &ComponentOptions,
    child: &ComponentOptions,
    vm_creation: bool,
) -> Rc<ComponentOptions> {
    // fold extends and mixins into the parent side first
    let mut base = parent.clone();
    if let Some(extends) = &child.extends {
        base = (*merge_options(&base, extends, vm_creation)).clone();
    }
    for mixin in &child.mixins {
        base = (*merge_options(&base, mixin, vm_creation)).clone();
    }

    if !vm_creation && (child.el.is_some() || !child.props_data.is_empty()) {
        warn("options \"el\" and \"props_data\" are only respected during instance creation");
    }

    let mut merged = ComponentOptions::default();
    merged.name = strat_default(&base.name, &child.name);
    merged.data = strat_data(&base.data, &child.data);
    merged.props = strat_extend(&base.props, &child.props);
    merged.computed = strat_extend(&base.computed, &child.computed);
    merged.methods = strat_extend(&base.methods, &child.methods);
    merged.inject = strat_extend(&base.inject, &child.inject);
    merged.custom = strat_extend(&base.custom, &child.custom);
    merged.watch = strat_watch(&base.watch, &child.watch);
    merged.hooks = strat_hooks(&base.hooks, &child.hooks);
    merged.error_captured = strat_hook_vec(&base.error_captured, &child.error_captured);
    merged.components = strat_assets(&base.components, &child.components);
    merged.provide = strat_provide(&base.provide, &child.provide);
    merged.render = strat_default(&base.render, &child.render);
    merged.scope_id = strat_default(&base.scope_id, &child.scope_id);
    if vm_creation {
        merged.el = strat_default(&base.el, &child.el);
        merged.props_data = strat_extend(&base.props_data, &child.props_data);
    }
    Rc::new(merged)
}

/// Default strategy: child wins if defined, else parent.
fn strat_default<T: Clone>(parent: &Option<T>, child: &Option<T>) -> Option<T> {
    child.clone().or_else(|| parent.clone())
}

/// Shallow key merge: child keys override parent keys.
fn strat_extend<T: Clone>(
    parent: &IndexMap<String, T>,
    child: &IndexMap<String, T>,
) -> IndexMap<String, T> {
    let mut out = parent.clone();
    for (key, value) in child {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Watch entries concatenate per key so parent and child handlers both fire.
fn strat_watch(
    parent: &IndexMap<String, Vec<WatchEntry>>,
    child: &IndexMap<String, Vec<WatchEntry>>,
) -> IndexMap<String, Vec<WatchEntry>> {
    let mut out = parent.clone();
    for (key, entries) in child {
        out.entry(key.clone())
            .or_insert_with(Vec::new)
            .extend(entries.iter().cloned());
    }
    out
}

/// The merged data producer calls child then parent and deep-merges the
/// results; the child wins on collisions.
fn strat_data(parent: &Option<DataFn>, child: &Option<DataFn>) -> Option<DataFn> {
    match (parent, child) {
        (None, None) => None,
        (Some(p), None) => Some(p.clone()),
        (None, Some(c)) => Some(c.clone()),
        (Some(p), Some(c)) => {
            let (p, c) = (p.clone(), c.clone());
            Some(Rc::new(move |vm: &Instance| {
                let to = c(vm);
                let from = p(vm);
                merge_data_maps(&to, &from);
                to
            }))
        }
    }
}

/// Fill `to` with keys it is missing from `from`; recurse where both sides
/// hold maps.
fn merge_data_maps(to: &MapRef, from: &MapRef) {
    for (key, from_value) in from.to_entries() {
        if !to.contains_key(&key) {
            to.set(&key, from_value);
        } else if let (Value::Map(to_child), Value::Map(from_child)) =
            (to.peek(&key), &from_value)
        {
            if !Rc::ptr_eq(&to_child.0, &from_child.0) {
                merge_data_maps(&to_child, from_child);
            }
        }
    }
}

fn strat_provide(parent: &Option<ProvideDecl>, child: &Option<ProvideDecl>) -> Option<ProvideDecl> {
    match (parent, child) {
        (None, None) => None,
        (Some(p), None) => Some(p.clone()),
        (None, Some(c)) => Some(c.clone()),
        (Some(p), Some(c)) => {
            let (p, c) = (p.clone(), c.clone());
            Some(ProvideDecl::Factory(Rc::new(move |vm: &Instance| {
                let to = c.resolve(vm);
                let from = p.resolve(vm);
                merge_data_maps(&to, &from);
                to
            })))
        }
    }
}

fn strat_hooks(parent: &LifecycleHooks, child: &LifecycleHooks) -> LifecycleHooks {
    LifecycleHooks {
        before_create: strat_hook_vec(&parent.before_create, &child.before_create),
        created: strat_hook_vec(&parent.created, &child.created),
        before_mount: strat_hook_vec(&parent.before_mount, &child.before_mount),
        mounted: strat_hook_vec(&parent.mounted, &child.mounted),
        before_update: strat_hook_vec(&parent.before_update, &child.before_update),
        updated: strat_hook_vec(&parent.updated, &child.updated),
        before_destroy: strat_hook_vec(&parent.before_destroy, &child.before_destroy),
        destroyed: strat_hook_vec(&parent.destroyed, &child.destroyed),
        activated: strat_hook_vec(&parent.activated, &child.activated),
        deactivated: strat_hook_vec(&parent.deactivated, &child.deactivated),
    }
}

/// Concatenate parent then child, dropping exact duplicates (a mixin applied
/// twice) while preserving first-seen order.
fn strat_hook_vec<T: ?Sized>(parent: &[Rc<T>], child: &[Rc<T>]) -> Vec<Rc<T>> {
    let mut out: Vec<Rc<T>> = Vec::with_capacity(parent.len() + child.len());
    for hook in parent.iter().chain(child.iter()) {
        if !out.iter().any(|seen| Rc::ptr_eq(seen, hook)) {
            out.push(hook.clone());
        }
    }
    out
}

/// Assets chain: the merged registry owns the child's registrations and
/// falls back to the parent chain on lookup.
fn strat_assets(parent: &Rc<AssetRegistry>, child: &Rc<AssetRegistry>) -> Rc<AssetRegistry> {
    let merged = AssetRegistry::new(Some(parent.clone()));
    for (id, options) in child.own_entries() {
        merged.own.borrow_mut().insert(id, options);
    }
    merged
}

// ---------------------------------------------------------------------------
// prop validation
// ---------------------------------------------------------------------------

/// Validate one prop against its declaration: required check, default
/// resolution, type check. Always returns a usable value.
pub(crate) fn validate_prop(
    key: &str,
    spec: &PropSpec,
    props_data: &IndexMap<String, Value>,
    vm: &Instance,
) -> Value {
    let supplied = props_data.get(key).cloned();
    let value = match supplied {
        Some(value) => value,
        None => {
            if spec.required {
                warn(&format!("missing required prop \"{}\"", key));
            }
            match &spec.default {
                Some(PropDefault::Value(value)) => {
                    if value.is_container() {
                        warn(&format!(
                            "prop \"{}\" has a container default; use a factory so instances don't share it",
                            key
                        ));
                    }
                    value.clone()
                }
                Some(PropDefault::Factory(f)) => f(vm),
                None => Value::Null,
            }
        }
    };
    if let Some(ty) = spec.ty {
        if !value.is_null() && !ty.matches(&value) {
            warn(&format!(
                "invalid prop \"{}\": expected {}, got {:?}",
                key,
                ty.name(),
                value
            ));
        }
    }
    value
}

// ---------------------------------------------------------------------------
// names
// ---------------------------------------------------------------------------

/// `foo-bar` -> `fooBar`
pub(crate) fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `fooBar` -> `FooBar`
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `fooBar` -> `foo-bar`
pub(crate) fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

static RESERVED_TAGS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    let mut set = FxHashSet::default();
    for tag in HTML_TAGS.iter().chain(SVG_TAGS.iter()) {
        set.insert(*tag);
    }
    set
});

pub(crate) fn is_reserved_tag(tag: &str) -> bool {
    RESERVED_TAGS.contains(tag)
}

pub(crate) fn is_builtin_tag(tag: &str) -> bool {
    matches!(tag, "slot" | "component")
}

pub(crate) fn is_svg_tag(tag: &str) -> bool {
    SVG_TAGS.contains(&tag)
}

fn validate_component_name(name: &str) {
    let valid_chars = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_chars {
        warn(&format!(
            "invalid component name \"{}\": use alphanumeric characters and hyphens, starting with a letter",
            name
        ));
    } else if is_builtin_tag(name) || is_reserved_tag(name) {
        warn(&format!(
            "component name \"{}\" conflicts with a reserved or built-in tag",
            name
        ));
    }
}

const HTML_TAGS: &[&str] = &[
    "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article",
    "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6", "hgroup", "nav", "section",
    "div", "dd", "dl", "dt", "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol",
    "p", "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em",
    "i", "kbd", "mark", "q", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong",
    "sub", "sup", "time", "u", "var", "wbr", "area", "audio", "map", "track", "video", "embed",
    "object", "param", "source", "canvas", "script", "noscript", "del", "ins", "caption", "col",
    "colgroup", "table", "thead", "tbody", "td", "th", "tr", "button", "datalist", "fieldset",
    "form", "input", "label", "legend", "meter", "optgroup", "option", "output", "progress",
    "select", "textarea", "details", "dialog", "menu", "menuitem", "summary", "content",
    "element", "shadow", "template", "blockquote", "iframe", "tfoot",
];

const SVG_TAGS: &[&str] = &[
    "svg", "animate", "circle", "clippath", "cursor", "defs", "desc", "ellipse", "filter",
    "font-face", "foreignobject", "g", "glyph", "image", "line", "marker", "mask", "missing-glyph",
    "path", "pattern", "polygon", "polyline", "rect", "switch", "symbol", "text", "textpath",
    "tspan", "use", "view",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camelize_and_friends() {
        assert_eq!(camelize("foo-bar-baz"), "fooBarBaz");
        assert_eq!(capitalize("fooBar"), "FooBar");
        assert_eq!(hyphenate("fooBar"), "foo-bar");
    }

    #[test]
    fn reserved_tags_are_known() {
        assert!(is_reserved_tag("div"));
        assert!(is_reserved_tag("svg"));
        assert!(!is_reserved_tag("my-widget"));
    }
}
