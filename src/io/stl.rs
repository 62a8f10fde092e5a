use crate::float_types::Real;
use crate::io::IoError;
use crate::mesh::Mesh;
use nalgebra::Point3;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Read an ASCII or binary STL stream into a triangle mesh.
    ///
    /// Facet normals stored in the file are ignored and recomputed from the
    /// winding, see [`Mesh::from_triangles`].
    pub fn from_stl_reader<R: Read + Seek>(
        reader: &mut R,
        metadata: Option<S>,
    ) -> Result<Mesh<S>, IoError> {
        let stl_reader = stl_io::create_stl_reader(reader)?;

        let mut triangles = Vec::new();
        for tri_result in stl_reader {
            let tri = tri_result?;
            triangles.push(tri.vertices.map(|v| {
                Point3::new(v[0] as Real, v[1] as Real, v[2] as Real)
            }));
        }

        if triangles.is_empty() {
            return Err(IoError::MalformedInput("STL contains no facets".into()));
        }

        Ok(Mesh::from_triangles(&triangles, metadata))
    }

    /// Read an STL file from disk.
    ///
    /// ```no_run
    /// # use layerstack::mesh::Mesh;
    /// let mesh = Mesh::<()>::from_stl_file("part.stl", None)?;
    /// # Ok::<(), layerstack::io::IoError>(())
    /// ```
    pub fn from_stl_file(path: impl AsRef<Path>, metadata: Option<S>) -> Result<Mesh<S>, IoError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(IoError::MalformedPath(format!(
                "{} is a directory",
                path.display()
            )));
        }
        let mut reader = BufReader::new(File::open(path)?);
        Self::from_stl_reader(&mut reader, metadata)
    }
}
