// vim: set ai et ts=4 sw=4 sts=4:
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NetError {
    #[error("layer coefficient vector has length {got}, expected a multiple of 1 + dim_in = {slot}")]
    CoefficientLength { slot: usize, got: usize },

    #[error("net has no layers")]
    Empty,
}

// One fully-connected ReLU layer. Coefficients are laid out per output
// neuron: the bias first (subtracted from the weighted sum), then dim_in
// weights.
#[derive(Debug, Clone)]
pub struct Layer {
    dim_in:  usize,
    dim_out: usize,
    coef:    Vec<f64>,
}

impl Layer {
    pub fn new(dim_in: usize, coef: Vec<f64>) -> Result<Layer, NetError> {
        let slot = 1 + dim_in;
        if coef.is_empty() || coef.len() % slot != 0 {
            return Err(NetError::CoefficientLength { slot, got: coef.len() });
        }
        Ok(Layer {
            dim_in,
            dim_out: coef.len() / slot,
            coef,
        })
    }

    pub fn dim_in(&self) -> usize {
        self.dim_in
    }
    pub fn dim_out(&self) -> usize {
        self.dim_out
    }

    pub fn evaluate(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.dim_in);
        let mut out = Vec::with_capacity(self.dim_out);
        for slot in self.coef.chunks_exact(1 + self.dim_in) {
            let v = slot[1..].iter().zip(input).map(|(w, x)| w * x).sum::<f64>() - slot[0];
            out.push(if v > 0.0 { v } else { 0.0 });
        }
        out
    }
}

// Feed-forward composition of layers; immutable after construction and
// shareable read-only between solver instances.
#[derive(Debug, Clone)]
pub struct Net {
    layers: Vec<Layer>,
}

impl Net {
    pub fn new(coefs: &[Vec<f64>], mut dim_in: usize) -> Result<Net, NetError> {
        if coefs.is_empty() {
            return Err(NetError::Empty);
        }
        let mut layers = Vec::with_capacity(coefs.len());
        for c in coefs {
            let layer = Layer::new(dim_in, c.clone())?;
            dim_in = layer.dim_out();
            layers.push(layer);
        }
        Ok(Net { layers })
    }

    pub fn from_layers(layers: Vec<Layer>) -> Result<Net, NetError> {
        if layers.is_empty() {
            return Err(NetError::Empty);
        }
        Ok(Net { layers })
    }

    pub fn dim_in(&self) -> usize {
        self.layers[0].dim_in()
    }
    pub fn dim_out(&self) -> usize {
        self.layers[self.layers.len() - 1].dim_out()
    }

    pub fn evaluate(&self, input: &[f64]) -> Vec<f64> {
        let mut out = input.to_vec();
        for layer in &self.layers {
            out = layer.evaluate(&out);
        }
        out
    }
}
