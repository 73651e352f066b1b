use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BspEntitiesError {
    #[error("Cannot parse all entities")]
    Parse,
}

#[derive(Debug, thiserror::Error)]
pub enum BspError {
    #[error("Cannot parse entity lump: {source}")]
    ParseEntities {
        #[source]
        source: BspEntitiesError,
    },
    #[error("Cannot parse planes")]
    ParsePlanes,
    #[error("Cannot parse textures")]
    ParseTextures,
    #[error("Cannot parse vertices")]
    ParseVertices,
    #[error("Cannot parse visibility")]
    ParseVisibility,
    #[error("Cannot parse nodes")]
    ParseNodes,
    #[error("Cannot parse texinfo")]
    ParseTexInfo,
    #[error("Cannot parse faces")]
    ParseFaces,
    #[error("Cannot parse lightmap")]
    ParseLightmap,
    #[error("Cannot parse clipnodes")]
    ParseClipNodes,
    #[error("Cannot parse leaves")]
    ParseLeaves,
    #[error("Cannot parse mark surfaces")]
    ParseMarkSurfaces,
    #[error("Cannot parse edges")]
    ParseEdges,
    #[error("Cannot parse surface edges")]
    ParseSurfEdges,
    #[error("Cannot parse models")]
    ParseModels,
    #[error("Failed to parse a lump section")]
    LumpParseError, // Generic error for the `rest` call or unhandled parsing
    #[error("Generic failture to parse with nom")]
    NomParsingError,
    #[error("Bsp version is not 30: {version}")]
    BspVersion { version: i32 },
    #[error("Cannot read file `{path}`: {source}")]
    IOError {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

impl BspError {
    pub fn to_result<T>(self) -> Result<T, Self> {
        Err(self)
    }
}

impl BspEntitiesError {
    pub fn to_result<T>(self) -> Result<T, Self> {
        Err(self)
    }
}

/// A named lump, for error messages that need to point at one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lump {
    Entities,
    Planes,
    Textures,
    Vertices,
    Visibility,
    Nodes,
    TexInfo,
    Faces,
    Lighting,
    ClipNodes,
    Leaves,
    MarkSurfaces,
    Edges,
    SurfEdges,
    Models,
}

impl std::fmt::Display for Lump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Entities => "entities",
            Self::Planes => "planes",
            Self::Textures => "textures",
            Self::Vertices => "vertices",
            Self::Visibility => "visibility",
            Self::Nodes => "nodes",
            Self::TexInfo => "texinfo",
            Self::Faces => "faces",
            Self::Lighting => "lighting",
            Self::ClipNodes => "clipnodes",
            Self::Leaves => "leaves",
            Self::MarkSurfaces => "marksurfaces",
            Self::Edges => "edges",
            Self::SurfEdges => "surfedges",
            Self::Models => "models",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("cannot fit {count} maps within the +/-MAX_MAP_COORD world bounds")]
    InsufficientRoom { count: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no axis-aligned plane separates the two maps' bounding boxes")]
    NotSeparable,
    #[error("cannot fit {count} maps within the +/-MAX_MAP_COORD world bounds")]
    InsufficientRoom { count: usize },
    #[error("merged {lump} lump would exceed its format limit")]
    LimitExceeded { lump: Lump },
    #[error("{lump} lump is corrupt: {detail}")]
    LumpCorrupt { lump: Lump, detail: String },
    #[error("merge was cancelled")]
    Cancelled,
}

impl From<PackError> for MergeError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::InsufficientRoom { count } => Self::InsufficientRoom { count },
        }
    }
}

/// Non-fatal condition recorded during a merge; returned alongside a
/// successful result rather than aborting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("{leaves} leaf visibility bit(s) fell off the end of a PVS row while shifting")]
    VisOverflow { leaves: usize },
}
