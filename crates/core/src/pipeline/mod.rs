pub mod batch_manifest;
pub mod compose_video_use_case;
pub mod extract_matte_use_case;
pub mod infrastructure;
pub mod job_result;
pub mod pipeline_logger;
pub mod replace_background_use_case;

#[cfg(test)]
mod test_support;
