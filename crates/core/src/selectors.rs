/// Selector table for every logical UI control the pipeline touches.
///
/// The target application is third-party and server-rendered; its element
/// ids drift between releases. Keeping one selector per logical control in
/// a single table makes a markup change a one-line update instead of a
/// scattered edit.
#[derive(Debug, Clone)]
pub struct Selectors {
    /// Login form container; absence means the session is already valid.
    pub login_form: &'static str,
    pub login_username: &'static str,
    pub login_password: &'static str,
    pub login_submit: &'static str,
    /// Continue control on the post-login release-notes splash.
    pub interstitial_continue: &'static str,
    /// Label elements scanned when building the label-to-field index.
    pub filter_label: &'static str,
    /// Submit control of a report filter form.
    pub filter_submit: &'static str,
    /// Control opening the print-options menu on the report viewer.
    pub print_menu: &'static str,
    /// Entries of the opened print-options menu.
    pub print_menu_item: &'static str,
    /// Row links of the scheduled-reports table.
    pub scheduled_report_row: &'static str,
    /// Customer-facing print link on a work-order detail page.
    pub work_order_customer_print: &'static str,
    /// Technician print link on a work-order detail page.
    pub work_order_technician_print: &'static str,
    /// URL fragment identifying report-viewer targets opened in new tabs.
    pub report_viewer_path: &'static str,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            login_form: "#frmLogin",
            login_username: "#txtUserName",
            login_password: "#txtPassword",
            login_submit: "#btnLogin",
            interstitial_continue: "#btnReleaseNotesContinue",
            filter_label: "label",
            filter_submit: "#btnViewReport",
            print_menu: "#btnPrintOptions",
            print_menu_item: ".print-options-menu .menu-item",
            scheduled_report_row: "#tblScheduledReports tr.report-row a",
            work_order_customer_print: "#lnkCustomerPrint",
            work_order_technician_print: "#lnkTechnicianPrint",
            report_viewer_path: "reportviewer",
        }
    }
}
