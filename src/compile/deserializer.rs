//! Deserializer emission
//!
//! Mirrors serializer emission: walks the same type expression and appends
//! statements that rebuild the typed value from its wire shape. Union wire
//! pairs are dispatched by their integer tag, so no classification
//! ambiguity check is needed on this side.

use std::sync::Arc;

use crate::codegen::{Capability, Cond, Constant, Expr, Key, Op, Place, ProgramBuilder};
use crate::descriptor::{normalize, Kind, Primitive, TypeExpr};
use crate::error::{Error, Result};
use crate::runtime::Value;

/// Append statements that deserialize `in_var` into `out_var` (of type `ty`)
pub fn emit_deserializer(
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
        Kind::Optional => emit_deserializer(Some(&d.args[0]), in_var, out_var, g),
        Kind::Union => emit_union(&d.args, in_var, out_var, g),
        Kind::Tuple => {
            let mut parts = Vec::with_capacity(d.args.len());
            for (i, elem) in d.args.iter().enumerate() {
                let part = g.assign_new(Expr::index(Expr::var(in_var), Key::Lit(i)));
                emit_deserializer(Some(elem), &part, &part, g)?;
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
            emit_deserializer(Some(&d.args[0]), &item, &item, g)?;
            g.assign(Place::index(out_var, Key::Var(index)), Expr::var(item));
            g.dedent();

            // A variadic tuple encodes like a sequence but reconstructs
            // a tuple.
            if matches!(ty, Some(TypeExpr::VariadicTuple(_))) {
                let ctor = g.bind_const(Constant::Func(Arc::new(to_tuple)));
                g.assign(
                    Place::var(out_var),
                    Expr::Call(ctor, vec![Expr::var(out_var)]),
                );
            }
            Ok(())
        }
        Kind::Mapping => {
            let built = g.assign_new(Expr::EmptyMap);
            let key = g.fresh_var();
            let value = g.fresh_var();
            g.literal(Op::ForPairs {
                key: key.clone(),
                value: value.clone(),
                iter: Expr::var(in_var),
            });
            g.indent();
            emit_deserializer(Some(&d.args[0]), &key, &key, g)?;
            emit_deserializer(Some(&d.args[1]), &value, &value, g)?;
            g.assign(Place::index(&built, Key::Var(key)), Expr::var(value));
            g.dedent();
            g.assign(Place::var(out_var), Expr::var(built));
            Ok(())
        }
        Kind::Bytes => {
            g.ensure_capability(Capability::Base64);
            g.assign(
                Place::var(out_var),
                Expr::Call("b64decode".to_string(), vec![Expr::var(in_var)]),
            );
            Ok(())
        }
        Kind::Timestamp => {
            g.ensure_capability(Capability::Timestamp);
            g.assign(
                Place::var(out_var),
                Expr::Call("fromisoformat".to_string(), vec![Expr::var(in_var)]),
            );
            Ok(())
        }
        Kind::Hook => {
            let hook = d.hook.as_ref().ok_or_else(|| Error::MalformedProgram {
                message: "hook kind without hook class".to_string(),
            })?;
            hook.emit_deserializer(in_var, out_var, g)
        }
        Kind::Unknown => Err(Error::unsupported(
            ty.map(|t| t.to_string()).unwrap_or_else(|| "null".to_string()),
        )),
    }
}

/// Union decoding: branch on the wire pair's integer tag and decode the
/// payload as the selected member
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
        return emit_deserializer(Some(members[0]), in_var, out_var, g);
    }

    for (i, member) in members.iter().enumerate() {
        let cond = Cond::Eq(
            Expr::index(Expr::var(in_var), Key::Lit(0)),
            Expr::Int(i as i64),
        );
        if i == 0 {
            g.literal(Op::If { cond });
        } else {
            g.literal(Op::Elif { cond });
        }
        g.indent();
        let payload = g.assign_new(Expr::index(Expr::var(in_var), Key::Lit(1)));
        emit_deserializer(Some(member), &payload, out_var, g)?;
        g.dedent();
    }
    Ok(())
}

fn to_tuple(args: &[Value]) -> Result<Value> {
    let items = args
        .first()
        .ok_or_else(|| Error::type_mismatch("one argument", "none"))?
        .as_items()?;
    Ok(Value::Tuple(items.to_vec()))
}

fn is_null(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Primitive(Primitive::Null))
}
