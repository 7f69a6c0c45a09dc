//! Overviewer configuration — serializes one render batch into the Python
//! config file the renderer reads.
//!
//! Each staged world gets three renders (overworld by day, nether, end), all
//! carrying the sign marker filter defined in the header.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

/// Python-side sign filter. A sign whose joined text looks like
/// `*i:house;t:Home;h:Spawn base*` becomes a map marker: `i` picks an icon
/// from `custom_icons/`, `t` is the label and `h` the hover text. Unknown keys
/// are printed and ignored; a segment without exactly one `:` drops the sign.
const SIGN_FILTER: &str = r#"def signFilter(poi):
    if poi["id"] not in ("Sign", "minecraft:sign"):
        return None
    data = poi["Text1"] + poi["Text2"] + poi["Text3"] + poi["Text4"]
    if len(data) < 2 or data[0] != "*" or data[-1] != "*":
        return None
    hover, text = "", ""
    for segment in data.split(";"):
        parts = segment.strip().strip("*").split(":")
        if len(parts) != 2:
            return None
        key, value = parts
        if key == "i":
            poi["icon"] = "custom_icons/%s.png" % value
        elif key == "t":
            text = value
        elif key == "h":
            hover = value
        else:
            print("unknown marker key %s" % key)
    return (hover, text)
"#;

/// Renderer-wide settings written once at the top of the file.
#[derive(Debug, Clone)]
pub struct Header {
    pub processes: u32,
    pub custom_icons_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// One server's staged world, queued for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldRender {
    pub server: String,
    pub world_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Overworld, Dimension::Nether, Dimension::End];

    fn suffix(self) -> &'static str {
        match self {
            Dimension::Overworld => "day",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Dimension::Overworld => "Overworld",
            Dimension::Nether => "Nether",
            Dimension::End => "End",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        }
    }

    /// Python expression for the render mode.
    fn rendermode(self) -> &'static str {
        match self {
            Dimension::Overworld => "smooth_lighting",
            Dimension::Nether => "normal",
            Dimension::End => "[Base(), EdgeLines(), SmoothLighting(strength=0.5)]",
        }
    }
}

/// Python string literal. JSON string escapes are valid Python escapes.
fn py_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

pub fn write_config(out: &mut impl Write, header: &Header, worlds: &[WorldRender]) -> Result<()> {
    writeln!(out, "processes = {}", header.processes)?;
    writeln!(out)?;
    write!(out, "{}", SIGN_FILTER)?;
    writeln!(out)?;
    writeln!(
        out,
        "customwebassets = {}",
        py_str(&header.custom_icons_dir.to_string_lossy())
    )?;
    writeln!(out, "outputdir = {}", py_str(&header.output_dir.to_string_lossy()))?;
    writeln!(out)?;

    for world in worlds {
        let name = py_str(&world.server);
        writeln!(
            out,
            "worlds[{}] = {}",
            name,
            py_str(&world.world_path.to_string_lossy())
        )?;
        writeln!(out)?;
        for dim in Dimension::ALL {
            writeln!(
                out,
                "renders[{}] = {{",
                py_str(&format!("{}{}", world.server, dim.suffix()))
            )?;
            writeln!(out, "    \"world\": {},", name)?;
            writeln!(out, "    \"title\": {},", py_str(dim.title()))?;
            writeln!(out, "    \"rendermode\": {},", dim.rendermode())?;
            writeln!(out, "    \"dimension\": {},", py_str(dim.name()))?;
            writeln!(
                out,
                "    \"markers\": [dict(name=\"Markers\", filterFunction=signFilter)],"
            )?;
            writeln!(out, "}}")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
