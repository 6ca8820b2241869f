//! Forwarding members synthesized to satisfy interface slots.
//!
//! A proxy is a descriptor, not code: the emission layer materializes it as
//! an explicit interface implementation on `implementing_type` whose body
//! passes every parameter, in order and with the same by-ref-ness, to
//! `target` and returns its result.

use serde::Serialize;
use sharpc_binder::{MemberId, MethodSignature, ParamType, TypeArena, TypeId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyMember {
    pub implementing_type: TypeId,
    /// Interface-qualified name, e.g. `N.IShape.Area`.
    pub name: String,
    pub interface: TypeId,
    /// Interface member declaring the slot.
    pub slot_member: MemberId,
    #[serde(skip)]
    pub signature: MethodSignature,
    /// Member the body calls.
    pub target: MemberId,
    /// Accessor or method name invoked on the target.
    pub target_method: String,
}

impl ProxyMember {
    pub fn new(
        types: &TypeArena,
        implementing_type: TypeId,
        interface: TypeId,
        slot_member: MemberId,
        signature: &MethodSignature,
        target: MemberId,
        target_method: &str,
    ) -> Self {
        ProxyMember {
            implementing_type,
            name: format!("{}.{}", types.full_name(interface), signature.name),
            interface,
            slot_member,
            signature: signature.clone(),
            target,
            target_method: target_method.to_string(),
        }
    }

    /// Parameters passed through to the target.
    pub fn forwarded(&self) -> &[ParamType] {
        &self.signature.parameters
    }

    /// `Y.I.M(int) -> X.M`
    pub fn describe(&self, types: &TypeArena) -> String {
        let target_owner = types.member(self.target).owner;
        format!(
            "{} -> {}.{}",
            types.signature_display(self.implementing_type, &MethodSignature {
                name: self.name.clone(),
                ..self.signature.clone()
            }),
            types.full_name(target_owner),
            self.target_method,
        )
    }
}
