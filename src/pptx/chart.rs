//! Charts: type, title, categories and cached series values.
//!
//! Values come from the caches stored in the chart part (`c:strCache`,
//! `c:numCache`). Embedded workbooks are not read.

use super::presentation::{rel_id_attr, Presentation};
use crate::error::{Error, Result};
use crate::model::ShapeKey;
use quick_xml::events::Event;
use serde::Serialize;

/// Parsed chart part.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    /// Local name of the first plot element, e.g. `barChart`
    pub chart_type: Option<String>,
    /// Chart title (if available)
    pub title: Option<String>,
    /// Category labels from the first series
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// A data series in a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Series name (legend label)
    pub name: String,
    /// Cached point values
    pub values: Vec<f64>,
}

impl ChartData {
    /// Whether the chart has no categories or no series.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.series.is_empty()
    }
}

/// Parse chart XML to extract data
pub fn parse_chart_xml(xml: &str) -> Result<ChartData> {
    let mut reader = quick_xml::Reader::from_str(xml);
    // title runs keep their edge spaces; cached values are trimmed on their own
    reader.config_mut().trim_text(false);

    let mut chart_data = ChartData::default();
    let mut buf = Vec::new();

    // State tracking
    let mut in_plot_area = false;
    let mut in_title = false;
    let mut in_title_text = false;
    let mut in_ser = false;
    let mut in_tx = false;
    let mut in_cat = false;
    let mut in_val = false;
    let mut in_cache = false;
    let mut in_pt = false;
    let mut in_v = false;

    let mut title_text = String::new();
    let mut current_series_name = String::new();
    let mut current_values: Vec<f64> = Vec::new();
    let mut current_text = String::new();
    let mut pt_idx: Option<usize> = None;

    // Categories are captured from the first series only
    let mut temp_categories: Vec<String> = Vec::new();
    let mut categories_captured = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = e.name().local_name();
                match local_name.as_ref() {
                    b"plotArea" => in_plot_area = true,
                    b"title" if !in_ser => in_title = true,
                    b"t" if in_title => in_title_text = true,
                    name if in_plot_area
                        && chart_data.chart_type.is_none()
                        && name.ends_with(b"Chart") =>
                    {
                        chart_data.chart_type = Some(String::from_utf8_lossy(name).into_owned());
                    }
                    b"ser" => {
                        in_ser = true;
                        current_series_name.clear();
                        current_values.clear();
                    }
                    b"tx" if in_ser => in_tx = true,
                    b"cat" if in_ser => in_cat = true,
                    b"val" | b"yVal" if in_ser => in_val = true,
                    b"strCache" | b"numCache" => in_cache = true,
                    b"pt" => {
                        in_pt = true;
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"idx" {
                                pt_idx = String::from_utf8_lossy(&attr.value).parse::<usize>().ok();
                            }
                        }
                    }
                    b"v" if in_pt || in_tx => {
                        in_v = true;
                        current_text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.name().local_name();
                match local_name.as_ref() {
                    b"plotArea" => in_plot_area = false,
                    b"title" if in_title => {
                        in_title = false;
                        if !title_text.is_empty() {
                            chart_data.title = Some(std::mem::take(&mut title_text));
                        }
                    }
                    b"t" => in_title_text = false,
                    b"ser" => {
                        if !current_series_name.is_empty() || !current_values.is_empty() {
                            let name = if current_series_name.is_empty() {
                                format!("Series {}", chart_data.series.len() + 1)
                            } else {
                                current_series_name.clone()
                            };
                            chart_data.series.push(ChartSeries {
                                name,
                                values: current_values.clone(),
                            });
                        }

                        if !categories_captured && !temp_categories.is_empty() {
                            chart_data.categories = temp_categories.clone();
                            categories_captured = true;
                        }
                        temp_categories.clear();
                        in_ser = false;
                    }
                    b"tx" => in_tx = false,
                    b"cat" => in_cat = false,
                    b"val" | b"yVal" => in_val = false,
                    b"strCache" | b"numCache" => in_cache = false,
                    b"pt" => {
                        in_pt = false;
                        pt_idx = None;
                    }
                    b"v" => {
                        if in_v {
                            let text = current_text.trim();
                            if in_tx {
                                current_series_name = text.to_string();
                            } else if in_cat && in_cache {
                                temp_categories.push(text.to_string());
                            } else if in_val && in_cache {
                                if let Ok(val) = text.parse::<f64>() {
                                    match pt_idx {
                                        Some(idx) => {
                                            if current_values.len() <= idx {
                                                current_values.resize(idx + 1, 0.0);
                                            }
                                            current_values[idx] = val;
                                        }
                                        None => current_values.push(val),
                                    }
                                }
                            }
                        }
                        in_v = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_v || in_title_text {
                    if let Ok(text) = e.unescape() {
                        if in_v {
                            current_text.push_str(&text);
                        } else {
                            title_text.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(chart_data)
}

/// A chart graphic frame.
pub struct Chart<'a> {
    pres: &'a Presentation,
    key: ShapeKey,
}

impl<'a> Chart<'a> {
    pub(crate) fn new(pres: &'a Presentation, key: ShapeKey) -> Self {
        Self { pres, key }
    }

    /// Package path of the chart part, through `c:chart/@r:id`.
    pub fn part_path(&self) -> Result<String> {
        let frame = self.pres.element(&self.key)?;
        let rel_id = frame
            .path(&["graphic", "graphicData", "chart"])
            .and_then(rel_id_attr)
            .ok_or_else(|| Error::MissingComponent(format!("{}: c:chart", self.key)))?;
        self.pres
            .part(self.key.part)?
            .target_path(rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("{}: chart relationship {}", self.key, rel_id)))
    }

    /// Parse the chart part.
    pub fn data(&self) -> Result<ChartData> {
        let xml = self.pres.container().read_xml(&self.part_path()?)?;
        parse_chart_xml(&xml)
    }

    pub fn chart_type(&self) -> Result<Option<String>> {
        Ok(self.data()?.chart_type)
    }

    pub fn title(&self) -> Result<Option<String>> {
        Ok(self.data()?.title)
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(self.data()?.categories)
    }

    pub fn series(&self) -> Result<Vec<ChartSeries>> {
        Ok(self.data()?.series)
    }
}
