//! Structured vectors ("smart vectors") for polynomial-IOP provers
//!
//! Trace columns of a polynomial IOP are usually structured: constant,
//! zero-padded on one side, or cyclically shifted. Materializing each of them
//! as a dense array of field elements is wasteful at zkEVM scale, so this
//! crate represents a fixed-length column as one of four variants:
//!
//! 1. [`SmartVector::Constant`]: the same value at every position
//! 2. [`SmartVector::Regular`]: a plain dense vector
//! 3. [`SmartVector::Rotated`]: a dense vector with an unapplied cyclic shift
//! 4. [`SmartVector::Windowed`]: a padding value everywhere except on one
//!    circular interval of explicit values
//!
//! and implements the prover-side algebra on top of them: n-ary weighted sums
//! and products that classify their operands and keep the result in the
//! cheapest representation that is still exact ([`lin_comb`], [`product`]),
//! radix-2 NTTs with closed-form short circuits for structured inputs
//! ([`fft`], [`fft_inverse`]), and coefficient/Lagrange-form polynomial
//! evaluation ([`eval_coeff`], [`evaluate_lagrange`],
//! [`evaluate_lagrange_batch`]).
//!
//! Field elements are opaque [`p3_field::Field`] values; the same code serves
//! base-field and extension-field columns, and the [`mixed`] layer combines
//! heterogeneous operand lists without paying extension arithmetic for the
//! base-field majority.

#![no_std]

extern crate alloc;

mod arithmetic;
mod fft;
mod interval;
mod mixed;
mod ops;
mod polynomial;
mod pool;
mod vector;

pub use arithmetic::*;
pub use fft::*;
pub use interval::*;
pub use mixed::*;
pub use ops::*;
pub use polynomial::*;
pub use pool::*;
pub use vector::*;

// Re-export key Plonky3 types
pub use p3_field::{ExtensionField, Field, TwoAdicField};

#[cfg(test)]
pub(crate) mod testutil;
