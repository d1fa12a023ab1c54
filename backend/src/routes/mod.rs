pub mod export;
pub mod timeline;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        assert_eq!(super::timeline::GET_TIMELINE_DATA, "get_timeline_data");
        assert_eq!(
            super::export::EXPORT_TIMELINE_SPREADSHEET,
            "export_timeline_spreadsheet"
        );
        assert_eq!(
            super::export::EXPORT_TIMELINE_DOCUMENT,
            "export_timeline_document"
        );
    }
}
