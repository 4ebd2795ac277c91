use coding::{encode_point, write_varuint, GeometryCodingParams};
use config::{scale_window, Classificator, RegionData};
use container::{ContainerWriter, DirEntry, SectionId};
use feature::{FeatureRecord, Geometry};
use geometry::{PointD, RectD};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::check_u32;
use crate::header::{DataHeader, VersionInfo};
use crate::packer::GeometryPacker;
use crate::simplifier::ScaleSimplifier;
use crate::{
    BuildError, ADDRESS_TAG, DATA_TAG, EXTERNAL_IDS_TAG, GEOMETRY_TAG, HEADER_TAG, METADATA_INDEX_TAG,
    METADATA_TAG, REGION_INFO_TAG, TRIANGLE_TAG, VERSION_TAG,
};

/// Consumer of features in final emission order.
pub trait FeatureSink {
    /// Emits one feature. Returns its id, or `None` if it was dropped.
    ///
    /// # Errors
    ///
    /// Only I/O failures and limit breaches; a feature without usable
    /// geometry is dropped, not an error.
    fn accept_feature(&mut self, record: &FeatureRecord) -> Result<Option<u32>, BuildError>;

    /// Completes the output once every feature has been accepted.
    fn finish(self) -> Result<BuildSummary, BuildError>;
}

/// Outcome of a finished build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub features_written: u32,
    pub features_dropped: u64,
    pub bounds: RectD,
    pub sections: Vec<DirEntry>,
}

struct Sections {
    version: SectionId,
    header: SectionId,
    region: SectionId,
    dat: SectionId,
    geom: Vec<SectionId>,
    trg: Vec<SectionId>,
    metaidx: SectionId,
    meta: SectionId,
    addr: SectionId,
    extids: Option<SectionId>,
}

impl Sections {
    /// Registers every section up front so the file layout is fixed
    /// regardless of which sections end up with data.
    fn register(writer: &mut ContainerWriter, header: &DataHeader) -> Result<Self, BuildError> {
        let version = writer.add_section(VERSION_TAG)?;
        let header_id = writer.add_section(HEADER_TAG)?;
        let region = writer.add_section(REGION_INFO_TAG)?;
        let dat = writer.add_section(DATA_TAG)?;
        let mut geom = Vec::with_capacity(header.scales_count());
        let mut trg = Vec::with_capacity(header.scales_count());
        for i in 0..header.scales_count() {
            geom.push(writer.add_section(&format!("{}{}", GEOMETRY_TAG, i))?);
            trg.push(writer.add_section(&format!("{}{}", TRIANGLE_TAG, i))?);
        }
        let metaidx = writer.add_section(METADATA_INDEX_TAG)?;
        let meta = writer.add_section(METADATA_TAG)?;
        let addr = writer.add_section(ADDRESS_TAG)?;
        let extids = if header.map_type().has_external_ids() {
            Some(writer.add_section(EXTERNAL_IDS_TAG)?)
        } else {
            None
        };
        Ok(Self {
            version,
            header: header_id,
            region,
            dat,
            geom,
            trg,
            metaidx,
            meta,
            addr,
            extids,
        })
    }
}

/// Drives the per-scale loop for every feature and writes the container.
///
/// Feature ids are assigned densely in acceptance order. Dropped features
/// consume no id.
pub struct MultiScaleCollector<'a> {
    path: PathBuf,
    writer: ContainerWriter,
    sections: Sections,
    header: DataHeader,
    classificator: &'a Classificator,
    region: &'a RegionData,
    version_date: u32,
    bounds: RectD,
    bounds_override: Option<RectD>,
    metadata_index: Vec<(u32, u32)>,
    external_ids: Vec<(u64, u32)>,
    next_id: u32,
    dropped: u64,
    record: Vec<u8>,
}

fn snap_ring(coding: &GeometryCodingParams, points: &[PointD], close: bool) -> Vec<PointD> {
    let mut out: Vec<PointD> = points
        .iter()
        .map(|p| coding.snap((p.x, p.y)).into())
        .collect();
    if close && !out.is_empty() && out.first() != out.last() {
        out.push(out[0]);
    }
    out
}

impl<'a> MultiScaleCollector<'a> {
    /// Starts a container at `path` for the file described by `header`.
    ///
    /// # Errors
    ///
    /// Fails if the staging area next to `path` cannot be created.
    pub fn new(
        path: &Path,
        header: DataHeader,
        classificator: &'a Classificator,
        region: &'a RegionData,
        version_date: u32,
    ) -> Result<Self, BuildError> {
        let mut writer = ContainerWriter::create(path)?;
        let sections = Sections::register(&mut writer, &header)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            sections,
            header,
            classificator,
            region,
            version_date,
            bounds: RectD::empty(),
            bounds_override: None,
            metadata_index: Vec::new(),
            external_ids: Vec::new(),
            next_id: 0,
            dropped: 0,
            record: Vec::with_capacity(256),
        })
    }

    #[must_use]
    pub fn header(&self) -> &DataHeader {
        &self.header
    }

    /// Id the next accepted feature will get.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Replaces the observed bounds written to the header.
    pub fn set_bounds(&mut self, bounds: RectD) {
        self.bounds_override = Some(bounds);
    }

    fn drop_feature(&mut self, reason: &'static str, record: &FeatureRecord) -> Option<u32> {
        debug!(reason, types = ?record.types, "feature dropped");
        self.dropped += 1;
        None
    }

    /// Packs the geometry of a line or area for every scale it is drawn at.
    fn pack_scales(
        &mut self,
        record: &FeatureRecord,
        packer: &mut GeometryPacker<'_>,
        simplifier: &ScaleSimplifier,
    ) -> Result<(), BuildError> {
        let coding = *self.header.coding();
        let scales = self.header.scales().to_vec();
        let finest = scales.len() - 1;
        let raw_road_scale = self.header.map_type().raw_road_scale();
        let is_road = self.classificator.is_road(&record.types);

        let outer = snap_ring(&coding, record.outer_points(), record.is_area());
        let holes: Vec<Vec<PointD>> = record
            .inner_rings()
            .iter()
            .map(|ring| snap_ring(&coding, ring, true))
            .collect();

        for i in (0..scales.len()).rev() {
            let (lo, hi) = scale_window(&scales, i);
            if !self.classificator.is_drawable_in_range(&record.types, lo, hi) {
                continue;
            }
            let level = scales[i];

            match &record.geometry {
                Geometry::Line(_) => {
                    let points = if i == finest && raw_road_scale == Some(i) && is_road {
                        outer.clone()
                    } else {
                        simplifier.simplify(&outer, level)
                    };
                    let sink = self.writer.sink(self.sections.geom[i]);
                    packer
                        .add_line(sink, i, &points)
                        .map_err(|e| BuildError::io("write line geometry", &self.path, e))?;
                }
                Geometry::Area(_) => {
                    let simplified = simplifier.simplify(&outer, level);
                    let sink = self.writer.sink(self.sections.trg[i]);
                    packer
                        .add_area(sink, i, level, &simplified, &holes)
                        .map_err(|e| BuildError::io("write area geometry", &self.path, e))?;
                }
                Geometry::Point(_) => {}
            }
        }
        Ok(())
    }

    /// Appends the primary record. `scales` is the scale mask and the
    /// geometry offsets of a line or area.
    fn write_record(&mut self, record: &FeatureRecord, scales: Option<(u8, &[u64])>) -> Result<(), BuildError> {
        let coding = *self.header.coding();
        let buf = &mut self.record;
        buf.clear();
        buf.push(record.geom_type() as u8);
        write_varuint(buf, record.types.len() as u64).map_err(|e| BuildError::io("encode record", &self.path, e))?;
        for t in &record.types {
            write_varuint(buf, u64::from(*t)).map_err(|e| BuildError::io("encode record", &self.path, e))?;
        }
        match (&record.geometry, scales) {
            (Geometry::Point(p), _) => {
                encode_point(buf, &coding, (p.x, p.y)).map_err(|e| BuildError::io("encode record", &self.path, e))?
            }
            (_, Some((mask, offsets))) => {
                buf.push(mask);
                for &offset in offsets {
                    write_varuint(buf, offset).map_err(|e| BuildError::io("encode record", &self.path, e))?;
                }
            }
            (_, None) => {}
        }

        let sink = self.writer.sink(self.sections.dat);
        write_varuint(sink, self.record.len() as u64)
            .and_then(|_| sink.write_all(&self.record))
            .map_err(|e| BuildError::io("write dat", &self.path, e))?;
        check_u32("dat section size", sink.pos())?;
        Ok(())
    }

    fn write_attributes(&mut self, id: u32, record: &FeatureRecord) -> Result<(), BuildError> {
        let path = self.path.clone();

        let addr = self.writer.sink(self.sections.addr);
        record
            .address
            .write_to(addr)
            .map_err(|e| BuildError::io("write addr", &path, e))?;

        if !record.metadata.is_empty() {
            let meta = self.writer.sink(self.sections.meta);
            let offset = check_u32("metadata offset", meta.pos())?;
            record
                .metadata
                .write_to(meta)
                .map_err(|e| BuildError::io("write meta", &path, e))?;
            self.metadata_index.push((id, offset));
        }

        if let (Some(source_id), Some(_)) = (record.source_id, self.sections.extids) {
            self.external_ids.push((source_id, id));
        }
        Ok(())
    }

    fn finish_sections(&mut self) -> Result<(), BuildError> {
        let path_buf = self.path.clone();
        let path = path_buf.as_path();
        let io = |op: &'static str| move |e: std::io::Error| BuildError::io(op, path, e);

        VersionInfo::current(self.version_date)
            .write_to(self.writer.sink(self.sections.version))
            .map_err(io("write version"))?;

        let bounds = self.bounds_override.unwrap_or(self.bounds);
        self.header.set_bounds(bounds);
        self.header
            .save(self.writer.sink(self.sections.header))
            .map_err(io("write header"))?;

        self.region
            .write_to(self.writer.sink(self.sections.region))
            .map_err(io("write region info"))?;

        let idx = self.writer.sink(self.sections.metaidx);
        for &(id, offset) in &self.metadata_index {
            idx.write_all(&id.to_le_bytes())
                .and_then(|_| idx.write_all(&offset.to_le_bytes()))
                .map_err(io("write metaidx"))?;
        }

        if let Some(extids) = self.sections.extids {
            self.external_ids.sort_unstable();
            let sink = self.writer.sink(extids);
            for &(source_id, id) in &self.external_ids {
                sink.write_all(&source_id.to_le_bytes())
                    .and_then(|_| sink.write_all(&id.to_le_bytes()))
                    .map_err(io("write extids"))?;
            }
        }
        Ok(())
    }
}

impl FeatureSink for MultiScaleCollector<'_> {
    fn accept_feature(&mut self, record: &FeatureRecord) -> Result<Option<u32>, BuildError> {
        if record.types.is_empty() {
            return Ok(self.drop_feature("no types", record));
        }
        let Some((min_scale, _)) = self.classificator.drawable_range(&record.types) else {
            return Ok(self.drop_feature("no drawable type", record));
        };
        let finest_level = self.header.scales().last().copied().unwrap_or(0);
        if min_scale > finest_level {
            return Ok(self.drop_feature("not drawable in this file", record));
        }

        let packer = if record.is_line() || record.is_area() {
            let rect = record.limit_rect();
            let is_coast = self.classificator.is_coastline(&record.types);
            let simplifier = ScaleSimplifier::new(is_coast, rect);
            let coding = *self.header.coding();
            let mut packer = GeometryPacker::new(&coding, simplifier, is_coast, self.header.scales_count());
            self.pack_scales(record, &mut packer, &simplifier)?;
            if packer.is_empty() {
                return Ok(self.drop_feature("no geometry at any scale", record));
            }
            Some((packer.scale_mask(), packer.offsets().collect::<Vec<_>>()))
        } else {
            None
        };

        let id = self.next_id;
        self.write_record(record, packer.as_ref().map(|(mask, offsets)| (*mask, offsets.as_slice())))?;
        self.write_attributes(id, record)?;
        self.bounds.add_rect(&record.limit_rect());
        self.next_id += 1;
        Ok(Some(id))
    }

    fn finish(mut self) -> Result<BuildSummary, BuildError> {
        self.finish_sections()?;
        let bounds = self.header.bounds();
        let sections = self.writer.finish()?;
        info!(
            path = %self.path.display(),
            features = self.next_id,
            dropped = self.dropped,
            sections = sections.len(),
            "map file written"
        );
        Ok(BuildSummary {
            features_written: self.next_id,
            features_dropped: self.dropped,
            bounds,
            sections,
        })
    }
}
