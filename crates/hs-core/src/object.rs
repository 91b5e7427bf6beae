use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::value::{HostValue, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    pub kind: MemberKind,
    pub value_kind: ValueKind,
    pub writable: bool,
}

impl MemberInfo {
    pub fn property(name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            value_kind,
            writable: true,
        }
    }

    pub fn readonly_property(name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            writable: false,
            ..Self::property(name, value_kind)
        }
    }

    pub fn field(name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            value_kind,
            writable: true,
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            value_kind: ValueKind::Any,
            writable: false,
        }
    }

    pub fn is_data(&self) -> bool {
        self.kind != MemberKind::Method
    }
}

/// A host-side object that scripts and the path resolver can look into.
///
/// `members` describes the shape; `read` and `write` receive the exact
/// declared member name. Name matching (case folding, property-before-field
/// order) and value coercion happen in the resolver, so implementations only
/// map names to storage.
pub trait HostObject: Send + Sync {
    fn type_name(&self) -> &str;

    fn members(&self) -> Vec<MemberInfo>;

    fn read(&self, member: &str) -> Option<HostValue>;

    fn write(&mut self, _member: &str, _value: HostValue) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn HostObject>>);

impl ObjectRef {
    pub fn new<T: HostObject + 'static>(object: T) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, dyn HostObject> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, dyn HostObject + 'static> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    pub fn type_name(&self) -> String {
        self.read().type_name().to_string()
    }

    pub fn members(&self) -> Vec<MemberInfo> {
        self.read().members()
    }

    /// Finds a data member by case-insensitive name, properties first.
    pub fn find_member(&self, name: &str) -> Option<MemberInfo> {
        let members = self.members();
        let matches = |member: &&MemberInfo| member.name.eq_ignore_ascii_case(name);
        members
            .iter()
            .filter(|member| member.kind == MemberKind::Property)
            .find(matches)
            .or_else(|| {
                members
                    .iter()
                    .filter(|member| member.kind == MemberKind::Field)
                    .find(matches)
            })
            .cloned()
    }

    pub fn get(&self, name: &str) -> Option<HostValue> {
        let member = self.find_member(name)?;
        self.read().read(&member.name)
    }

    /// Writes `value` into the named member after coercing it to the
    /// member's declared kind.
    pub fn set(&self, name: &str, value: HostValue) -> bool {
        let Some(member) = self.find_member(name) else {
            return false;
        };
        if !member.writable {
            return false;
        }
        let Some(value) = value.coerce(member.value_kind) else {
            return false;
        };
        self.write().write(&member.name, value)
    }
}

/// Non-owning handle to a host object; upgrades while the host keeps the
/// object alive.
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RwLock<dyn HostObject>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "WeakObjectRef({})", object.type_name()),
            None => f.write_str("WeakObjectRef(<dropped>)"),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.type_name())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name())
    }
}
