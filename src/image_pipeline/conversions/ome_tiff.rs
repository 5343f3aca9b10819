use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::image_pipeline::{
    common::{
        error::{ConversionError, Result},
        timing::{PipelineTimings, Timer},
    },
    conversions::{
        progress::{ConversionStage, ProgressSink},
        pyramid_writer::PyramidWriter,
    },
    descriptor::parse_descriptor,
    ome::{OmeMetadata, resolve_pixel_type},
    pyramid::PyramidPlan,
    source::{SourceContainer, SourcePage, SourceReader, TiffSourceReader},
    tiff::{BigTiffWriter, ConversionConfig, PageWriter, TileCodec, codec_for},
};

/// Appended to the input path to name the output file.
pub const OUTPUT_SUFFIX: &str = ".lossless.ome.tiff";

pub fn output_path_for(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(OUTPUT_SUFFIX);
    PathBuf::from(path)
}

/// Everything derived from the source before the output is created.
pub struct PreparedConversion {
    pub plan: PyramidPlan,
    pub metadata_xml: String,
    pub base_page: SourcePage,
}

pub struct OmeTiffPipeline<R: SourceReader> {
    reader: R,
    codec: Box<dyn TileCodec>,
    config: ConversionConfig,
}

impl OmeTiffPipeline<TiffSourceReader> {
    pub fn new(config: ConversionConfig) -> Result<Self> {
        Self::with_custom(TiffSourceReader, config)
    }
}

impl<R: SourceReader> OmeTiffPipeline<R> {
    pub fn with_custom(reader: R, config: ConversionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            codec: codec_for(config.compression),
            config,
        })
    }

    /// Parses, indexes and synthesizes metadata. Nothing is written.
    #[instrument(skip(self, source, sink, timings))]
    pub fn prepare<S: SourceContainer + ?Sized>(
        &self,
        source: &mut S,
        sink: &dyn ProgressSink,
        timings: &mut PipelineTimings,
    ) -> Result<PreparedConversion> {
        sink.on_stage(ConversionStage::Parsing);
        let timer = Timer::start("parse_descriptor");
        let descriptor = source.descriptor()?;
        let table = parse_descriptor(&descriptor)?;
        timings.record(timer);

        sink.on_stage(ConversionStage::Indexing);
        let timer = Timer::start("index_pyramid");
        let plan = PyramidPlan::from_table(&table)?;
        timings.record(timer);

        sink.on_stage(ConversionStage::BuildingMetadata);
        let timer = Timer::start("build_metadata");
        let base_page = source.read_page(plan.base_entry().page)?;
        if self.config.validate_dimensions && (base_page.width == 0 || base_page.height == 0) {
            return Err(ConversionError::InvalidDimensions(base_page.width, base_page.height));
        }
        let pixel_type = resolve_pixel_type(base_page.pixel_type(), self.config.pixel_type_policy)?;
        let metadata = OmeMetadata::new(
            &plan,
            base_page.width,
            base_page.height,
            pixel_type,
            self.config.physical_size_um,
        );
        let metadata_xml = metadata.to_xml()?;
        timings.record(timer);

        info!(
            channels = plan.channel_count(),
            levels = plan.levels_per_channel(),
            width = base_page.width,
            height = base_page.height,
            pixel_type,
            "Pyramid plan ready"
        );

        Ok(PreparedConversion {
            plan,
            metadata_xml,
            base_page,
        })
    }

    /// Writes a prepared conversion into `writer` and finishes it.
    pub fn write_prepared<S, P>(
        &self,
        prepared: PreparedConversion,
        source: &mut S,
        writer: &mut P,
        sink: &dyn ProgressSink,
        timings: &mut PipelineTimings,
    ) -> Result<u64>
    where
        S: SourceContainer + ?Sized,
        P: PageWriter + ?Sized,
    {
        let timer = Timer::start("write_pages");
        let pages = PyramidWriter::new(&self.config, self.codec.as_ref()).write(
            &prepared.plan,
            &prepared.metadata_xml,
            prepared.base_page,
            source,
            writer,
            sink,
        )?;
        writer.finish()?;
        timings.record(timer);
        Ok(pages)
    }

    /// Converts an opened source into an arbitrary page writer.
    #[instrument(skip(self, source, writer, sink))]
    pub fn convert<S, P>(&self, source: &mut S, writer: &mut P, sink: &dyn ProgressSink) -> Result<u64>
    where
        S: SourceContainer + ?Sized,
        P: PageWriter + ?Sized,
    {
        sink.on_status("Initializing...");
        let mut timings = PipelineTimings::new();
        let result = self
            .prepare(source, sink, &mut timings)
            .and_then(|prepared| self.write_prepared(prepared, source, writer, sink, &mut timings));
        self.report(result, sink, &timings)
    }

    /// Converts `input_path` into `<input_path>.lossless.ome.tiff` and returns
    /// the output path.
    #[instrument(skip(self, input_path, sink))]
    pub fn convert_file<P: AsRef<Path>>(&self, input_path: P, sink: &dyn ProgressSink) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        let output_path = output_path_for(input_path);

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );
        sink.on_status("Initializing...");

        let mut timings = PipelineTimings::new();
        let result = {
            let _span = tracing::info_span!("open_source").entered();
            self.reader.open(input_path)
        }
        .and_then(|mut source| {
            let prepared = self.prepare(&mut source, sink, &mut timings)?;
            self.write_file(prepared, &mut source, &output_path, sink, &mut timings)
        });

        self.report(result, sink, &timings)?;
        Ok(output_path)
    }

    fn write_file<S: SourceContainer + ?Sized>(
        &self,
        prepared: PreparedConversion,
        source: &mut S,
        output_path: &Path,
        sink: &dyn ProgressSink,
        timings: &mut PipelineTimings,
    ) -> Result<u64> {
        let result = {
            let mut writer = {
                let _span = tracing::info_span!("create_output_file").entered();
                BigTiffWriter::create(output_path)
            }?;
            // The writer is dropped at the end of this block, closing the file.
            self.write_prepared(prepared, source, &mut writer, sink, timings)
        };

        if result.is_err() && self.config.remove_partial_output {
            match std::fs::remove_file(output_path) {
                Ok(()) => warn!(output = %output_path.display(), "Removed partial output"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(output = %output_path.display(), error = %e, "Could not remove partial output"),
            }
        }
        result
    }

    fn report(&self, result: Result<u64>, sink: &dyn ProgressSink, timings: &PipelineTimings) -> Result<u64> {
        match &result {
            Ok(pages) => {
                sink.on_stage(ConversionStage::Done);
                sink.on_status("Done!");
                info!(pages, "Conversion complete");
                timings.log_summary();
            }
            Err(e) => {
                sink.on_stage(ConversionStage::Failed);
                sink.on_status(&format!("Error: {}", e));
                error!(error = %e, "Conversion failed");
            }
        }
        result
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}
