//! Graph input/output names of scikit-learn ONNX classifier exports

/// skl2onnx default input name
const DEFAULT_INPUT: &str = "float_input";
/// skl2onnx default probability output name
const DEFAULT_PROBABILITIES: &str = "output_probability";

/// Names a classifier session is fed and read through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoNames {
    pub input: String,
    /// int64 predicted-label output, when the graph has one
    pub label: Option<String>,
    pub probabilities: String,
}

impl IoNames {
    /// Pick names from the graph's declared inputs and outputs.
    ///
    /// The first input feeds the features. Outputs are matched by substring
    /// (`label`, `prob`); without a `prob` output the last output is used.
    pub fn resolve(inputs: &[&str], outputs: &[&str]) -> Self {
        let input = inputs.first().copied().unwrap_or(DEFAULT_INPUT).to_string();

        let label = outputs
            .iter()
            .find(|name| name.contains("label"))
            .map(|name| name.to_string());

        let probabilities = outputs
            .iter()
            .find(|name| name.contains("prob"))
            .or_else(|| outputs.last())
            .copied()
            .unwrap_or(DEFAULT_PROBABILITIES)
            .to_string();

        Self {
            input,
            label,
            probabilities,
        }
    }
}
