use leptos::prelude::*;

/// 绑定字符串信号的带标签输入框
#[component]
pub fn Field(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(default = "text")] kind: &'static str,
    #[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
    view! {
        <label class="form-control w-full max-w-xs">
            <span class="label-text">{label}</span>
            <input
                type=kind
                class="input input-bordered input-sm"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

/// 去除空白后的文本，空白时为 `None`
pub fn optional_text(value: RwSignal<String>) -> Option<String> {
    let text = value.get_untracked().trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// 可选的数字输入，接受小数逗号
///
/// # 返回
/// - `Ok(None)` 输入为空
/// - `Ok(Some(T))` 解析成功
/// - `Err` 文本不是数字
pub fn optional_number<T: std::str::FromStr>(value: RwSignal<String>) -> Result<Option<T>, T::Err> {
    optional_text(value)
        .map(|text| text.replace(',', ".").parse::<T>())
        .transpose()
}
