//! Declarations: the things a qualified name can resolve to.

use crate::base::{FileId, FqName, Name};

use super::ids::{DeclId, ModuleId};

// ============================================================================
// VISIBILITY
// ============================================================================

/// Access modifier of a declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
    /// Declared inside a function or block body.
    Local,
}

impl Visibility {
    /// Private-like visibilities are never importable.
    pub fn is_private_like(self) -> bool {
        matches!(self, Visibility::Private | Visibility::Local)
    }

    /// Whether an import of a declaration with this visibility needs the
    /// full visibility check. Public and protected names are importable
    /// from anywhere.
    pub fn must_check_in_imports(self) -> bool {
        !matches!(self, Visibility::Public | Visibility::Protected)
    }

    pub fn display(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
            Visibility::Local => "local",
        }
    }
}

// ============================================================================
// DECLARATIONS
// ============================================================================

/// What sort of class a class declaration is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Object,
    CompanionObject,
    EnumEntry,
    /// The synthetic class of a script or REPL line.
    Script,
}

impl ClassKind {
    /// Single-instance kinds: their members cannot be star-imported.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            ClassKind::Object | ClassKind::CompanionObject | ClassKind::EnumEntry
        )
    }

    /// Kinds whose instance members may be imported by name.
    pub fn exposes_members_for_import(self) -> bool {
        matches!(self, ClassKind::Object)
    }
}

/// A package view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageDecl {
    pub fq_name: FqName,
    /// The enclosing package; `None` only for the root.
    pub parent: Option<DeclId>,
}

/// A class, interface, object or other classifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Name,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub container: DeclId,
    pub module: ModuleId,
    pub source: Option<FileId>,
}

/// A function or property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: Name,
    pub visibility: Visibility,
    pub container: DeclId,
    pub module: ModuleId,
    pub source: Option<FileId>,
    /// Static members live in a class's static scope.
    pub is_static: bool,
}

/// A declaration in the namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declaration {
    Package(PackageDecl),
    Class(ClassDecl),
    Function(MemberDecl),
    Property(MemberDecl),
}

impl Declaration {
    /// The simple name; `None` for the root package.
    pub fn name(&self) -> Option<Name> {
        match self {
            Declaration::Package(p) => p.fq_name.short_name(),
            Declaration::Class(c) => Some(c.name),
            Declaration::Function(m) | Declaration::Property(m) => Some(m.name),
        }
    }

    /// The visibility; packages have none and are visible everywhere.
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Declaration::Package(_) => None,
            Declaration::Class(c) => Some(c.visibility),
            Declaration::Function(m) | Declaration::Property(m) => Some(m.visibility),
        }
    }

    /// The containing declaration (child → parent only).
    pub fn container(&self) -> Option<DeclId> {
        match self {
            Declaration::Package(p) => p.parent,
            Declaration::Class(c) => Some(c.container),
            Declaration::Function(m) | Declaration::Property(m) => Some(m.container),
        }
    }

    pub fn module(&self) -> Option<ModuleId> {
        match self {
            Declaration::Package(_) => None,
            Declaration::Class(c) => Some(c.module),
            Declaration::Function(m) | Declaration::Property(m) => Some(m.module),
        }
    }

    pub fn source(&self) -> Option<FileId> {
        match self {
            Declaration::Package(_) => None,
            Declaration::Class(c) => c.source,
            Declaration::Function(m) | Declaration::Property(m) => m.source,
        }
    }

    pub fn as_package(&self) -> Option<&PackageDecl> {
        match self {
            Declaration::Package(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match self {
            Declaration::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_package(&self) -> bool {
        matches!(self, Declaration::Package(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Declaration::Class(_))
    }

    /// Functions and properties.
    pub fn is_value(&self) -> bool {
        matches!(self, Declaration::Function(_) | Declaration::Property(_))
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        match self {
            Declaration::Package(_) => {}
            Declaration::Class(c) => c.visibility = visibility,
            Declaration::Function(m) | Declaration::Property(m) => m.visibility = visibility,
        }
    }

    pub(crate) fn set_module(&mut self, module: ModuleId) {
        match self {
            Declaration::Package(_) => {}
            Declaration::Class(c) => c.module = module,
            Declaration::Function(m) | Declaration::Property(m) => m.module = module,
        }
    }

    pub(crate) fn set_source(&mut self, file: FileId) {
        match self {
            Declaration::Package(_) => {}
            Declaration::Class(c) => c.source = Some(file),
            Declaration::Function(m) | Declaration::Property(m) => m.source = Some(file),
        }
    }
}

// ============================================================================
// RESOLUTION TARGETS
// ============================================================================

/// What a reference resolves to.
///
/// Members of an object imported by name are reached through a synthetic
/// adapter so they can be used like free functions and properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Decl(DeclId),
    ImportedFromObject { member: DeclId, object: DeclId },
}

impl Target {
    /// The declaration whose visibility and kind this target carries.
    pub fn decl(self) -> DeclId {
        match self {
            Target::Decl(id) => id,
            Target::ImportedFromObject { member, .. } => member,
        }
    }
}

impl From<DeclId> for Target {
    fn from(id: DeclId) -> Self {
        Target::Decl(id)
    }
}

/// Resolution result for one segment or reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Package(DeclId),
    Class(DeclId),
    /// Function or property.
    Member(Target),
    Unresolved,
    /// Two or more visible candidates.
    Ambiguous(Vec<Target>),
}

impl ResolutionOutcome {
    /// Classify a single target by the kind of its declaration.
    pub fn of(declaration: &Declaration, target: Target) -> Self {
        match (declaration, target) {
            (Declaration::Package(_), Target::Decl(id)) => ResolutionOutcome::Package(id),
            (Declaration::Class(_), Target::Decl(id)) => ResolutionOutcome::Class(id),
            _ => ResolutionOutcome::Member(target),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::Package(_) | ResolutionOutcome::Class(_) | ResolutionOutcome::Member(_)
        )
    }

    /// The package or class this outcome names, if any.
    pub fn package_or_class(&self) -> Option<DeclId> {
        match self {
            ResolutionOutcome::Package(id) | ResolutionOutcome::Class(id) => Some(*id),
            _ => None,
        }
    }
}

/// A resolved receiver: the package or class a qualifier node denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Qualifier {
    Package(DeclId),
    Class(DeclId),
}

impl Qualifier {
    pub fn decl(self) -> DeclId {
        match self {
            Qualifier::Package(id) | Qualifier::Class(id) => id,
        }
    }
}

/// The declaration a visibility check is made from.
///
/// `file` lets a package-level requester see private top-level
/// declarations of its own file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Requester {
    pub owner: DeclId,
    pub module: ModuleId,
    pub file: Option<FileId>,
}

impl Requester {
    pub fn new(owner: DeclId, module: ModuleId) -> Self {
        Self {
            owner,
            module,
            file: None,
        }
    }

    pub fn in_file(mut self, file: FileId) -> Self {
        self.file = Some(file);
        self
    }
}
