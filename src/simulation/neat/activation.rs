//! Activation functions handed to [`super::Genome::run_network`].

/// Logistic sigmoid used by the sensing pipeline.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Pass-through activation, handy for checking weight paths.
#[inline]
pub fn identity(x: f32) -> f32 {
    x
}
