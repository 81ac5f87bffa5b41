//! Serializer emission
//!
//! Walks a type expression and appends statements to a builder that turn a
//! typed value into its wire shape. Emission recurses structurally; the
//! builder's variable counter keeps names unique across all levels.

use crate::codegen::{Capability, Cond, Constant, Expr, Key, Op, Place, ProgramBuilder};
use crate::descriptor::{normalize, type_tag, Kind, Primitive, TypeExpr};
use crate::error::{Error, Result};

/// Append statements that serialize `in_var` (of type `ty`) into `out_var`
///
/// `None` stands for the null type. Fails with a schema error for shapes
/// that cannot be serialized; never inspects a value.
pub fn emit_serializer(
    ty: Option<&TypeExpr>,
    in_var: &str,
    out_var: &str,
    g: &mut ProgramBuilder,
) -> Result<()> {
    let d = normalize(ty);
    match d.kind {
        Kind::Primitive(_) => {
            g.assign(Place::var(out_var), Expr::var(in_var));
            Ok(())
        }
        // Nullability carries no wire representation of its own
        Kind::Optional => emit_serializer(Some(&d.args[0]), in_var, out_var, g),
        Kind::Union => emit_union(&d.args, in_var, out_var, g),
        Kind::Tuple => {
            let mut parts = Vec::with_capacity(d.args.len());
            for (i, elem) in d.args.iter().enumerate() {
                let part = g.assign_new(Expr::index(Expr::var(in_var), Key::Lit(i)));
                emit_serializer(Some(elem), &part, &part, g)?;
                parts.push(Expr::var(part));
            }
            g.assign(Place::var(out_var), Expr::Tuple(parts));
            Ok(())
        }
        Kind::Sequence => {
            g.assign(Place::var(out_var), Expr::CopyList(Box::new(Expr::var(in_var))));
            let index = g.fresh_var();
            let item = g.fresh_var();
            g.literal(Op::For {
                index: index.clone(),
                item: item.clone(),
                iter: Expr::var(out_var),
            });
            g.indent();
            emit_serializer(Some(&d.args[0]), &item, &item, g)?;
            g.assign(Place::index(out_var, Key::Var(index)), Expr::var(item));
            g.dedent();
            Ok(())
        }
        Kind::Mapping => emit_mapping(&d.args[0], &d.args[1], in_var, out_var, g),
        Kind::Bytes => {
            g.ensure_capability(Capability::Base64);
            g.assign(
                Place::var(out_var),
                Expr::Call("b64encode".to_string(), vec![Expr::var(in_var)]),
            );
            Ok(())
        }
        Kind::Timestamp => {
            g.ensure_capability(Capability::Timestamp);
            g.assign(
                Place::var(out_var),
                Expr::Call("isoformat".to_string(), vec![Expr::var(in_var)]),
            );
            Ok(())
        }
        Kind::Hook => {
            let hook = d.hook.as_ref().ok_or_else(|| Error::MalformedProgram {
                message: "hook kind without hook class".to_string(),
            })?;
            hook.emit_serializer(in_var, out_var, g)
        }
        Kind::Unknown => Err(Error::unsupported(display_of(ty))),
    }
}

/// Union encoding: dispatch on runtime classification, producing a
/// `(member_index, payload)` pair
///
/// Null members are dropped before dispatch. A union whose remaining
/// members share a classification cannot be dispatched and is rejected
/// here, before any value is seen.
fn emit_union(
    members: &[TypeExpr],
    in_var: &str,
    out_var: &str,
    g: &mut ProgramBuilder,
) -> Result<()> {
    let members: Vec<&TypeExpr> = members.iter().filter(|m| !is_null(m)).collect();

    if members.is_empty() {
        return Err(Error::EmptyUnion);
    }
    if members.len() == 1 {
        return emit_serializer(Some(members[0]), in_var, out_var, g);
    }

    let tags = members
        .iter()
        .map(|m| type_tag(m))
        .collect::<Result<Vec<_>>>()?;
    for (i, tag) in tags.iter().enumerate() {
        if tags[..i].contains(tag) {
            return Err(Error::AmbiguousUnion {
                type_name: union_display(&members),
            });
        }
    }

    for (i, (member, tag)) in members.iter().zip(&tags).enumerate() {
        let class = g.bind_const(Constant::Class(tag.clone()));
        let cond = Cond::IsInstance {
            value: Expr::var(in_var),
            class,
        };
        if i == 0 {
            g.literal(Op::If { cond });
        } else {
            g.literal(Op::Elif { cond });
        }
        g.indent();
        let pair = g.assign_new(Expr::Tuple(vec![Expr::Int(i as i64), Expr::var(in_var)]));
        let tagged = TypeExpr::tuple([TypeExpr::int(), (*member).clone()]);
        emit_serializer(Some(&tagged), &pair, out_var, g)?;
        g.dedent();
    }
    Ok(())
}

/// String-keyed mappings serialize values in place over a shallow copy;
/// any other key type serializes both sides into a fresh mapping
fn emit_mapping(
    key_ty: &TypeExpr,
    value_ty: &TypeExpr,
    in_var: &str,
    out_var: &str,
    g: &mut ProgramBuilder,
) -> Result<()> {
    let key = g.fresh_var();
    let value = g.fresh_var();

    if matches!(key_ty, TypeExpr::Primitive(Primitive::Str)) {
        g.assign(Place::var(out_var), Expr::CopyMap(Box::new(Expr::var(in_var))));
        g.literal(Op::ForPairs {
            key: key.clone(),
            value: value.clone(),
            iter: Expr::var(out_var),
        });
        g.indent();
        emit_serializer(Some(value_ty), &value, &value, g)?;
        g.assign(Place::index(out_var, Key::Var(key)), Expr::var(value));
        g.dedent();
    } else {
        g.assign(Place::var(out_var), Expr::EmptyMap);
        g.literal(Op::ForPairs {
            key: key.clone(),
            value: value.clone(),
            iter: Expr::var(in_var),
        });
        g.indent();
        emit_serializer(Some(key_ty), &key, &key, g)?;
        emit_serializer(Some(value_ty), &value, &value, g)?;
        g.assign(Place::index(out_var, Key::Var(key)), Expr::var(value));
        g.dedent();
    }
    Ok(())
}

fn is_null(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Primitive(Primitive::Null))
}

fn display_of(ty: Option<&TypeExpr>) -> String {
    ty.map(|t| t.to_string()).unwrap_or_else(|| "null".to_string())
}

fn union_display(members: &[&TypeExpr]) -> String {
    members
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}
