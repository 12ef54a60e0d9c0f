//! Per-unit scope construction and the scope cache.

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::base::FileId;
use crate::syntax::{NodeId, SyntaxTree};

use super::binding::{BindingTrace, DiscardTrace, Trace};
use super::decl::Requester;
use super::imports::ImportOutcome;
use super::input::SourceUnit;
use super::resolve::QualifiedExpressionResolver;
use super::scope::{ImportLayer, ImportingScope, LexicalScope};

/// The outcome of building one unit's imports: what each directive
/// contributed plus the bindings and diagnostics produced on the way.
#[derive(Clone, Debug)]
pub struct ImportResolver {
    trace: Trace,
    layers: Vec<(NodeId, Option<ImportLayer>)>,
}

impl ImportResolver {
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The layer a directive produced, if any.
    pub fn layer_for(&self, directive: NodeId) -> Option<&ImportLayer> {
        self.layers
            .iter()
            .find(|(node, _)| *node == directive)
            .and_then(|(_, layer)| layer.as_ref())
    }

    pub fn layers(&self) -> impl Iterator<Item = &ImportLayer> {
        self.layers.iter().filter_map(|(_, layer)| layer.as_ref())
    }
}

/// Scopes of one unit.
#[derive(Clone, Debug)]
pub struct FileScopes {
    pub lexical_scope: Arc<LexicalScope>,
    pub import_resolver: Arc<ImportResolver>,
}

// ============================================================================
// FACTORY
// ============================================================================

/// Builds the scopes of a unit from its package header and imports.
#[derive(Clone, Debug)]
pub struct FileScopeFactory {
    resolver: QualifiedExpressionResolver,
    default_imports: Vec<String>,
}

impl FileScopeFactory {
    pub fn new(resolver: QualifiedExpressionResolver) -> Self {
        Self {
            resolver,
            default_imports: Vec::new(),
        }
    }

    /// Add an implicit import, e.g. `"lang.*"` or `"lang.Any"`. Default
    /// imports sit below every unit's explicit imports.
    pub fn with_default_import(mut self, path: impl Into<String>) -> Self {
        self.default_imports.push(path.into());
        self
    }

    pub fn resolver(&self) -> &QualifiedExpressionResolver {
        &self.resolver
    }

    pub fn create_scopes_for_file(&self, unit: &SourceUnit) -> FileScopes {
        let mut trace = Trace::new(unit.file());
        self.resolve_header(unit, &mut trace);
        let defaults = self.default_importing_scope(unit);
        let (importing, layers) = self.build_importing_scope(unit, defaults, &mut trace);
        let lexical_scope = Arc::new(LexicalScope::file(*unit.requester(), Some(importing)));
        tracing::debug!(file = ?unit.file(), layers = layers.len(), "created file scopes");
        FileScopes {
            lexical_scope,
            import_resolver: Arc::new(ImportResolver { trace, layers }),
        }
    }

    /// Build `previous`'s extension: the unit's imports over `previous`'s
    /// innermost importing scope, grafted on top of `previous`.
    pub fn create_scopes_over(&self, unit: &SourceUnit, previous: &Arc<LexicalScope>) -> FileScopes {
        let mut trace = Trace::new(unit.file());
        self.resolve_header(unit, &mut trace);
        let parent = previous.importing_scope().cloned();
        let (importing, layers) = self.build_importing_scope(unit, parent, &mut trace);
        FileScopes {
            lexical_scope: LexicalScope::graft_importing(previous, importing),
            import_resolver: Arc::new(ImportResolver { trace, layers }),
        }
    }

    fn resolve_header(&self, unit: &SourceUnit, trace: &mut Trace) {
        if let Some(header) = unit.tree().package_directive() {
            self.resolver.resolve_package_header(unit.tree(), header, trace);
        }
    }

    /// One group holding the unit's explicit import layers, over `parent`.
    pub fn build_importing_scope(
        &self,
        unit: &SourceUnit,
        parent: Option<Arc<ImportingScope>>,
        trace: &mut dyn BindingTrace,
    ) -> (Arc<ImportingScope>, Vec<(NodeId, Option<ImportLayer>)>) {
        let tree = unit.tree();
        let layers: Vec<(NodeId, Option<ImportLayer>)> = tree
            .import_directives()
            .iter()
            .map(|&directive| (directive, self.layer_of(tree, directive, unit.requester(), &mut *trace)))
            .collect();
        let group = ImportingScope::explicit(layers.iter().filter_map(|(_, l)| l.clone()).collect(), parent);
        (Arc::new(group), layers)
    }

    /// The layer a directive contributes. A plain import makes what it
    /// imports visible under its own name.
    fn layer_of(
        &self,
        tree: &SyntaxTree,
        directive: NodeId,
        requester: &Requester,
        trace: &mut dyn BindingTrace,
    ) -> Option<ImportLayer> {
        match self.resolver.resolve_import(tree, directive, Some(requester), trace) {
            ImportOutcome::Layer(layer) => Some(layer),
            ImportOutcome::Plain { name, targets } if !targets.is_empty() => {
                Some(ImportLayer::Single { alias: name, targets })
            }
            ImportOutcome::Plain { .. } | ImportOutcome::Skipped => None,
        }
    }

    /// Default imports for `unit`, resolved without diagnostics.
    fn default_importing_scope(&self, unit: &SourceUnit) -> Option<Arc<ImportingScope>> {
        if self.default_imports.is_empty() {
            return None;
        }
        let mut tree = SyntaxTree::new(unit.file(), Arc::clone(unit.tree().interner()));
        let directives: Vec<NodeId> = self
            .default_imports
            .iter()
            .map(|path| match path.strip_suffix(".*") {
                Some(container) => tree.import(container, true, None),
                None => tree.import(path, false, None),
            })
            .collect();
        let layers = directives
            .into_iter()
            .filter_map(|directive| self.layer_of(&tree, directive, unit.requester(), &mut DiscardTrace))
            .collect();
        Some(Arc::new(ImportingScope::default_imports(layers, None)))
    }
}

// ============================================================================
// SCOPE CACHE
// ============================================================================

/// Compute-once cache of unit scopes.
///
/// Scopes installed with [`FileScopeProvider::install_custom`] take
/// precedence over computed ones. When two threads compute the same unit
/// concurrently, the first stored result wins and the other is dropped.
#[derive(Debug)]
pub struct FileScopeProvider {
    factory: FileScopeFactory,
    inner: RwLock<ProviderInner>,
}

#[derive(Debug, Default)]
struct ProviderInner {
    custom: FxHashMap<FileId, Arc<FileScopes>>,
    computed: FxHashMap<FileId, Arc<FileScopes>>,
}

impl ProviderInner {
    fn get(&self, file: FileId) -> Option<&Arc<FileScopes>> {
        self.custom.get(&file).or_else(|| self.computed.get(&file))
    }
}

impl FileScopeProvider {
    pub fn new(factory: FileScopeFactory) -> Self {
        Self {
            factory,
            inner: RwLock::new(ProviderInner::default()),
        }
    }

    pub fn factory(&self) -> &FileScopeFactory {
        &self.factory
    }

    pub fn file_scopes(&self, unit: &SourceUnit) -> Arc<FileScopes> {
        let file = unit.file();

        // Fast path: read lock
        if let Some(scopes) = self.inner.read().get(file) {
            tracing::trace!(?file, "file scopes cache hit");
            return Arc::clone(scopes);
        }

        // Computed without the lock held
        let computed = Arc::new(self.factory.create_scopes_for_file(unit));

        let mut inner = self.inner.write();
        if let Some(scopes) = inner.custom.get(&file) {
            return Arc::clone(scopes);
        }
        Arc::clone(inner.computed.entry(file).or_insert(computed))
    }

    pub fn file_resolution_scope(&self, unit: &SourceUnit) -> Arc<LexicalScope> {
        Arc::clone(&self.file_scopes(unit).lexical_scope)
    }

    pub fn import_resolver(&self, unit: &SourceUnit) -> Arc<ImportResolver> {
        Arc::clone(&self.file_scopes(unit).import_resolver)
    }

    /// Install scopes built elsewhere (session lines) for `file`.
    pub fn install_custom(&self, file: FileId, scopes: Arc<FileScopes>) {
        self.inner.write().custom.insert(file, scopes);
    }

    /// Forget everything stored for `file`. Returns whether anything was.
    pub fn invalidate(&self, file: FileId) -> bool {
        let mut inner = self.inner.write();
        let custom = inner.custom.remove(&file).is_some();
        let computed = inner.computed.remove(&file).is_some();
        tracing::debug!(?file, "file scopes invalidated");
        custom || computed
    }

    pub fn is_cached(&self, file: FileId) -> bool {
        self.inner.read().get(file).is_some()
    }

    /// Compute scopes for independent units in parallel.
    pub fn prefetch(&self, units: &[SourceUnit]) {
        units.par_iter().for_each(|unit| {
            self.file_scopes(unit);
        });
    }
}
