//! Primary-area classification prompt.
//!
//! Placeholders: `{{abstract}}`, `{{year}}`. The reply is stored verbatim,
//! so the template asks for the area name alone.

/// Built-in template, overridable with `--prompt_path`
pub const PRIMARY_AREA_TEMPLATE: &str = r#"You are helping organize the accepted papers of ICLR {{year}}.

Every submission to ICLR {{year}} had to choose exactly one primary area from this list:
- societal considerations including fairness, safety, privacy
- representation learning for computer vision, audio, language, and other modalities
- unsupervised, self-supervised, semi-supervised, and supervised representation learning
- transfer learning, meta learning, and lifelong learning
- reinforcement learning
- metric learning, kernel learning, and sparse coding
- probabilistic methods (Bayesian methods, variational inference, sampling, UQ, etc.)
- generative models
- causal reasoning
- optimization
- learning theory
- learning on graphs and other geometries & topologies
- applications to robotics, autonomy, planning
- applications to neuroscience & cognitive science
- applications to physical sciences (physics, chemistry, biology, etc.)
- datasets and benchmarks
- neurosymbolic & hybrid AI systems (physics-informed, logic & formal reasoning, etc.)
- visualization or interpretation of learned representations
- infrastructure, software libraries, hardware, etc.
- general machine learning (i.e., none of the above)

Abstract:
{{abstract}}

Answer with the primary area from the list above that best fits this paper. Output the area exactly as written, with no other text."#;

/// Fill the template placeholders.
pub fn build_prompt(template: &str, abstract_text: &str, year: &str) -> String {
    template
        .replace("{{abstract}}", abstract_text)
        .replace("{{year}}", year)
}
