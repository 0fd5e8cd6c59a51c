//! The bundled demo: a corner life-and-death problem shown as a standard problem widget.

use crate::display::Theme;
use crate::widget::{DisplayOptions, SgfDefaults, WidgetOptions, WidgetType};

/// Black to play and kill the white group in the top-right corner.
pub const PROBLEM_SGF: &str = concat!(
    "(;GM[1]FF[4]CA[UTF-8]AP[Glift]ST[2]\n",
    "RU[Japanese]SZ[19]KM[0.00]\n",
    "C[Black to play. There aren't many options ",
    "to choose from, but you might be surprised at the answer!]",
    "PW[White]PB[Black]AW[pa][qa][nb][ob][qb][oc][pc][md][pd][ne][oe]\n",
    "AB[na][ra][mb][rb][lc][qc][ld][od][qd][le][pe][qe][mf][nf][of][pg]\n",
    "(;B[mc]\n",
    ";W[nc]C[White lives.])\n",
    "(;B[ma]\n",
    "(;W[oa]\n",
    ";B[nc]\n",
    ";W[nd]\n",
    ";B[mc]C[White dies.]GB[1])\n",
    "(;W[mc]\n",
    "(;B[oa]\n",
    ";W[nd]\n",
    ";B[pb]C[White lives])\n",
    "(;B[nd]\n",
    ";W[nc]\n",
    ";B[oa]C[White dies.]GB[1]))\n",
    "(;W[nd]\n",
    ";B[mc]\n",
    ";W[oa]\n",
    ";B[nc]C[White dies.]GB[1]))\n",
    "(;B[nc]\n",
    ";W[mc]C[White lives])\n",
    "(;B[]C[A default consideration]\n",
    ";W[mc]C[White lives easily]))",
);

/// Element the demo page renders into.
pub const SAMPLE_DIV_ID: &str = "glift_display1";

pub fn sample_options() -> WidgetOptions {
    WidgetOptions {
        sgf: PROBLEM_SGF.to_string(),
        sgf_defaults: SgfDefaults {
            widget_type: WidgetType::StandardProblem,
            ..SgfDefaults::default()
        },
        div_id: SAMPLE_DIV_ID.to_string(),
        display: DisplayOptions {
            theme: Theme::Depth,
            ..DisplayOptions::default()
        },
    }
}
