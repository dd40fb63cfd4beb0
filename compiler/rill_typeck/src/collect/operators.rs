//! Operator constraint collection.

use rill_ir::{BinaryOp, Expr, Span, UnaryOp};
use rill_types::{builtins, InferenceEnv, PrimitiveType, Type, TypeError};

use super::ConstraintCollector;

impl ConstraintCollector<'_> {
    pub(super) fn collect_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        let lhs_ty = self.synthesize(lhs, env)?;
        let rhs_ty = self.synthesize(rhs, env)?;

        if op.is_arithmetic() {
            self.collect_arithmetic(op, lhs_ty, rhs_ty, span)
        } else if op.is_comparison() {
            self.collect_comparison(op, lhs_ty, rhs_ty, span)
        } else {
            self.expect_boolean_operand(op.as_symbol(), lhs_ty, lhs.span)?;
            self.expect_boolean_operand(op.as_symbol(), rhs_ty, rhs.span)?;
            Ok(Type::Primitive(PrimitiveType::Boolean))
        }
    }

    /// Arithmetic requires numeric operands and widens along
    /// `Int < Long < Float < Double`. Unknown operands flow through a
    /// fresh result variable via subtype constraints.
    fn collect_arithmetic(
        &mut self,
        op: BinaryOp,
        lhs_ty: Type,
        rhs_ty: Type,
        span: Span,
    ) -> Result<Type, TypeError> {
        if let Some(wider) = builtins::wider_numeric_type(&lhs_ty, &rhs_ty) {
            return Ok(wider);
        }

        for ty in [&lhs_ty, &rhs_ty] {
            if !ty.is_var() && !ty.is_numeric() {
                return Err(TypeError::InvalidOperation {
                    message: format!(
                        "operator `{}` requires numeric operands, found `{ty}`",
                        op.as_symbol()
                    ),
                    span: Some(span),
                });
            }
        }

        // At least one operand is still unknown: both sides must agree,
        // and the operation takes that shared type.
        let result = if rhs_ty.is_var() {
            lhs_ty.clone()
        } else {
            rhs_ty.clone()
        };
        self.emit_equality(lhs_ty, rhs_ty, Some(span));
        Ok(result)
    }

    /// Comparisons accept compatible numerics or equal primitive types
    /// and produce `Boolean`.
    fn collect_comparison(
        &mut self,
        op: BinaryOp,
        lhs_ty: Type,
        rhs_ty: Type,
        span: Span,
    ) -> Result<Type, TypeError> {
        let boolean = Type::Primitive(PrimitiveType::Boolean);

        if lhs_ty.is_numeric() && rhs_ty.is_numeric() {
            return Ok(boolean);
        }
        if matches!((&lhs_ty, &rhs_ty), (Type::Primitive(a), Type::Primitive(b)) if a == b) {
            return Ok(boolean);
        }
        if lhs_ty.is_var() || rhs_ty.is_var() {
            self.emit_equality(lhs_ty, rhs_ty, Some(span));
            return Ok(boolean);
        }

        Err(TypeError::InvalidOperation {
            message: format!(
                "operator `{}` cannot compare `{lhs_ty}` with `{rhs_ty}`",
                op.as_symbol()
            ),
            span: Some(span),
        })
    }

    pub(super) fn collect_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        env: &InferenceEnv,
        span: Span,
    ) -> Result<Type, TypeError> {
        let operand_ty = self.synthesize(operand, env)?;
        match op {
            UnaryOp::Neg => {
                if operand_ty.is_numeric() || operand_ty.is_var() {
                    Ok(operand_ty)
                } else {
                    Err(TypeError::InvalidOperation {
                        message: format!(
                            "operator `-` requires a numeric operand, found `{operand_ty}`"
                        ),
                        span: Some(span),
                    })
                }
            }
            UnaryOp::Not => {
                self.expect_boolean_operand("!", operand_ty, span)?;
                Ok(Type::Primitive(PrimitiveType::Boolean))
            }
        }
    }

    fn expect_boolean_operand(
        &mut self,
        symbol: &str,
        ty: Type,
        span: Span,
    ) -> Result<(), TypeError> {
        let boolean = Type::Primitive(PrimitiveType::Boolean);
        if ty == boolean {
            return Ok(());
        }
        if ty.is_var() {
            self.emit_equality(boolean, ty, Some(span));
            return Ok(());
        }
        Err(TypeError::InvalidOperation {
            message: format!("operator `{symbol}` requires Boolean operands, found `{ty}`"),
            span: Some(span),
        })
    }
}
